//! The mapping interpreter.
//!
//! A rule list is run against one input record. Rules only ever add to a
//! [`State`]: the output identifier, property edits, and paint instructions
//! for the output tag tree. The tree itself is built once at the end (see
//! [`crate::builder`]), merged over the output specification's defaults.

use mctranslate_db::{
    CarryNbt, CodeCall, CodeInput, CodeOutput, MultiblockPart, NewNbt, NotFound, Rule,
    Specification, VersionData, WalkNode,
};
use mctranslate_nbt::{Compound, NamedTag, PathSegment, Tag, TagKind, path};
use thiserror::Error;

use crate::builder::{NbtEdit, build_nbt};
use crate::functions::{CodeError, CodeValue, FunctionRegistry};
use crate::lookup::{self, BlockLookup, LookupError};
use crate::objects::{Block, BlockCoordinates, BlockEntity, Entity, Properties, Record};
use crate::walk;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Block,
    Entity,
}

impl std::str::FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "block" => Ok(OutputKind::Block),
            "entity" => Ok(OutputKind::Entity),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("{rule} needs a block input")]
    NotABlock { rule: &'static str },
    #[error("{rule} used outside walk_input_nbt")]
    NoWalkPosition { rule: &'static str },
    #[error("carry_nbt at the root of the tree has no key to carry")]
    RootCarry,
    #[error("cannot cast a {from} tag to {to}")]
    Cast { from: TagKind, to: TagKind },
    #[error("an entity cannot be translated with an extra block entity")]
    EntityExtraInput,
    #[error("code function returned unknown output type {0:?}")]
    OutputType(String),
    #[error("the rules produced no output")]
    NoOutput,
    #[error("output identifier {0:?} is not namespace:base_name")]
    BadIdentifier(String),
    #[error(transparent)]
    Code(#[from] CodeError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    OutputSpecification(#[from] NotFound),
}

/// Everything the rules have decided so far.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub output_id: Option<String>,
    pub output_kind: Option<OutputKind>,
    /// Edits only; the output defaults are merged in later.
    pub properties: Properties,
    pub nbt: Vec<NbtEdit>,
    /// Sticky once set.
    pub extra_needed: bool,
    /// Sticky once cleared.
    pub cacheable: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            output_id: None,
            output_kind: None,
            properties: Properties::new(),
            nbt: Vec::new(),
            extra_needed: false,
            cacheable: true,
        }
    }
}

/// The record the current rules look at.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Block(&'a Block),
    Entity(&'a Entity),
}

impl<'a> Subject<'a> {
    pub fn namespace(&self) -> &'a str {
        match self {
            Subject::Block(block) => block.namespace(),
            Subject::Entity(entity) => &entity.namespace,
        }
    }

    pub fn base_name(&self) -> &'a str {
        match self {
            Subject::Block(block) => block.base_name(),
            Subject::Entity(entity) => &entity.base_name,
        }
    }
}

/// Position of a tree walk: the path from the root and the tag found there.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    pub path: &'a [PathSegment],
    pub value: &'a Tag,
}

#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub subject: Subject<'a>,
    /// The subject's block entity or entity tag tree, if known.
    pub nbt: Option<&'a NamedTag>,
    pub absolute: BlockCoordinates,
    /// Offset from the block the translation started at.
    pub relative: BlockCoordinates,
    pub cursor: Option<Cursor<'a>>,
}

impl<'a> Frame<'a> {
    pub fn new(subject: Subject<'a>, nbt: Option<&'a NamedTag>, absolute: BlockCoordinates) -> Self {
        Self {
            subject,
            nbt,
            absolute,
            relative: (0, 0, 0),
            cursor: None,
        }
    }

    /// The same frame positioned at `path`.
    pub fn at<'b>(&self, path: &'b [PathSegment], value: &'b Tag) -> Frame<'b>
    where
        'a: 'b,
    {
        Frame {
            subject: self.subject,
            nbt: self.nbt,
            absolute: self.absolute,
            relative: self.relative,
            cursor: Some(Cursor { path, value }),
        }
    }

    fn block(&self, rule: &'static str) -> Result<&'a Block, TranslateError> {
        match self.subject {
            Subject::Block(block) => Ok(block),
            Subject::Entity(_) => Err(TranslateError::NotABlock { rule }),
        }
    }

    /// The walk position for rules that read the input tree. `None` means the
    /// input tree is missing and more data is needed.
    fn walk_position(&self, rule: &'static str) -> Result<Option<Cursor<'a>>, TranslateError> {
        match (self.cursor, self.nbt) {
            (Some(cursor), _) => Ok(Some(cursor)),
            (None, None) => Ok(None),
            (None, Some(_)) => Err(TranslateError::NoWalkPosition { rule }),
        }
    }
}

/// Runs rule lists against frames, accumulating into a [`State`].
pub struct Interpreter<'a> {
    functions: &'a FunctionRegistry,
    lookup: Option<&'a dyn BlockLookup>,
}

impl<'a> Interpreter<'a> {
    pub fn new(functions: &'a FunctionRegistry, lookup: Option<&'a dyn BlockLookup>) -> Self {
        Self { functions, lookup }
    }

    /// Apply `rules` in order. Nested rule lists share `state`.
    pub fn run(&self, rules: &[Rule], frame: &Frame<'_>, state: &mut State) -> Result<(), TranslateError> {
        for rule in rules {
            self.apply(rule, frame, state)?;
        }
        Ok(())
    }

    fn apply(&self, rule: &Rule, frame: &Frame<'_>, state: &mut State) -> Result<(), TranslateError> {
        match rule {
            Rule::NewBlock(id) => {
                state.output_id = Some(id.clone());
                state.output_kind = Some(OutputKind::Block);
            }
            Rule::NewEntity(id) => {
                state.output_id = Some(id.clone());
                state.output_kind = Some(OutputKind::Entity);
            }
            Rule::NewProperties(properties) => {
                state
                    .properties
                    .extend(properties.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            Rule::CarryProperties(carry) => {
                let block = frame.block("carry_properties")?;
                for (key, allowed) in carry {
                    if let Some(value) = block.properties().get(key) {
                        if allowed.contains(value) {
                            state.properties.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
            Rule::MapProperties(entries) => {
                let block = frame.block("map_properties")?;
                for (key, cases) in entries {
                    let nested = block.properties().get(key).and_then(|v| cases.get(v));
                    if let Some(nested) = nested {
                        self.run(nested, frame, state)?;
                    }
                }
            }
            Rule::MapBlockName(cases) => {
                let block = frame.block("map_block_name")?;
                if let Some(nested) = cases.get(&block.namespaced_name()) {
                    self.run(nested, frame, state)?;
                }
            }
            Rule::Multiblock(parts) => self.multiblock(parts, frame, state)?,
            Rule::WalkInputNbt { path, node } => {
                self.walk_input_nbt(path.as_deref(), node, frame, state)?
            }
            Rule::NewNbt(entries) => self.new_nbt(entries, frame, state),
            Rule::CarryNbt(carry) => self.carry_nbt(carry, frame, state)?,
            Rule::MapNbt { cases, default } => {
                state.cacheable = false;
                let Some(cursor) = frame.walk_position("map_nbt")? else {
                    state.extra_needed = true;
                    return Ok(());
                };
                let nested = cases
                    .as_ref()
                    .and_then(|cases| cases.get(cursor.value))
                    .unwrap_or(default);
                self.run(nested, frame, state)?;
            }
            Rule::Code(call) => self.code(call, frame, state)?,
        }
        Ok(())
    }

    fn multiblock(
        &self,
        parts: &[MultiblockPart],
        frame: &Frame<'_>,
        state: &mut State,
    ) -> Result<(), TranslateError> {
        state.cacheable = false;
        let Some(lookup) = self.lookup else {
            state.extra_needed = true;
            return Ok(());
        };

        for part in parts {
            let relative = lookup::offset(frame.relative, part.coords);
            let (block, block_entity) = match lookup.block_at(relative) {
                Ok(found) => found,
                Err(err) => {
                    log::debug!("Skipping multiblock part at {relative:?}: {err}");
                    continue;
                }
            };
            let Some(block) = block else {
                log::debug!("Skipping multiblock part at {relative:?}: no block");
                continue;
            };

            let nbt = block_entity.as_ref().map(|be| &be.nbt);
            let value = match (frame.cursor, nbt) {
                (Some(cursor), Some(nbt)) => path::index(&nbt.tag, cursor.path),
                _ => None,
            };
            let neighbour = Frame {
                subject: Subject::Block(&block),
                nbt,
                absolute: lookup::offset(frame.absolute, part.coords),
                relative,
                cursor: frame.cursor.zip(value.as_deref()).map(|(cursor, value)| Cursor {
                    path: cursor.path,
                    value,
                }),
            };
            self.run(&part.functions, &neighbour, state)?;
        }
        Ok(())
    }

    fn walk_input_nbt(
        &self,
        custom_path: Option<&[PathSegment]>,
        node: &WalkNode,
        frame: &Frame<'_>,
        state: &mut State,
    ) -> Result<(), TranslateError> {
        state.cacheable = false;
        let Some(nbt) = frame.nbt else {
            state.extra_needed = true;
            return Ok(());
        };

        let Some(custom_path) = custom_path else {
            let cursor = frame.cursor.unwrap_or(Cursor {
                path: &[],
                value: &nbt.tag,
            });
            return walk::walk(self, node, &frame.at(cursor.path, cursor.value), state);
        };

        let Some(value) = path::index(&nbt.tag, custom_path) else {
            log::error!("Expected nbt data at {}", walk::describe(custom_path));
            return Ok(());
        };
        if let Some(expected) = custom_path.last().map(|s| s.kind) {
            if value.kind() != expected {
                log::error!(
                    "Expected nbt data at {} to be a {expected} tag but got {}",
                    walk::describe(custom_path),
                    value.kind()
                );
                return Ok(());
            }
        }
        walk::walk(self, node, &frame.at(custom_path, &value), state)
    }

    fn new_nbt(&self, entries: &[NewNbt], frame: &Frame<'_>, state: &mut State) {
        for entry in entries {
            let path = match (&entry.path, frame.cursor) {
                (Some(path), _) => path.clone(),
                (None, Some(cursor)) => cursor.path.to_vec(),
                (None, None) => Vec::new(),
            };
            state.nbt.push(NbtEdit {
                outer_name: entry.outer_name.clone(),
                outer_kind: entry.outer_type,
                path,
                key: entry.key.clone(),
                value: entry.value.clone(),
            });
        }
    }

    /// Copy the tag at the walk position, by default to the same place.
    pub(crate) fn carry_nbt(
        &self,
        carry: &CarryNbt,
        frame: &Frame<'_>,
        state: &mut State,
    ) -> Result<(), TranslateError> {
        state.cacheable = false;
        let Some(cursor) = frame.walk_position("carry_nbt")? else {
            state.extra_needed = true;
            return Ok(());
        };
        let (last, parent) = cursor.path.split_last().ok_or(TranslateError::RootCarry)?;

        let kind = carry.kind.unwrap_or(last.kind);
        let value = cursor.value.cast(kind).ok_or(TranslateError::Cast {
            from: cursor.value.kind(),
            to: kind,
        })?;
        state.nbt.push(NbtEdit {
            outer_name: carry.outer_name.clone(),
            outer_kind: carry.outer_type,
            path: carry.path.clone().unwrap_or_else(|| parent.to_vec()),
            key: carry.key.clone().unwrap_or_else(|| last.key.clone()),
            value,
        });
        Ok(())
    }

    fn code(&self, call: &CodeCall, frame: &Frame<'_>, state: &mut State) -> Result<(), TranslateError> {
        state.cacheable = false;

        let mut args = Vec::with_capacity(call.input.len());
        for input in &call.input {
            args.push(match input {
                CodeInput::Namespace => CodeValue::Str(frame.subject.namespace().to_string()),
                CodeInput::BaseName => CodeValue::Str(frame.subject.base_name().to_string()),
                CodeInput::Properties => {
                    CodeValue::Properties(frame.block("code")?.properties().clone())
                }
                CodeInput::Nbt => match frame.nbt {
                    Some(nbt) => CodeValue::Nbt(nbt.tag.clone()),
                    None => {
                        state.extra_needed = true;
                        CodeValue::Nbt(Tag::Compound(Compound::new()))
                    }
                },
                CodeInput::Location => CodeValue::Location(frame.absolute),
            });
        }

        let outputs = self.functions.call(&call.function, &args)?;
        for (value, slot) in outputs.into_iter().zip(&call.output) {
            match (slot, value) {
                (CodeOutput::OutputName, CodeValue::Str(name)) => state.output_id = Some(name),
                (CodeOutput::OutputType, CodeValue::Str(kind)) => {
                    state.output_kind = Some(kind.parse().map_err(TranslateError::OutputType)?)
                }
                (CodeOutput::NewProperties, CodeValue::Properties(properties)) => {
                    state.properties.extend(properties)
                }
                (CodeOutput::NewNbt, CodeValue::Edits(edits)) => state.nbt.extend(edits),
                (slot, value) => {
                    return Err(CodeError::Output {
                        function: call.function.clone(),
                        slot: format!("{slot:?}"),
                        found: value.kind_name(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

/// The result of one translation.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub output: Record,
    pub extra_output: Option<BlockEntity>,
    pub extra_needed: bool,
    pub cacheable: bool,
}

impl Translation {
    /// The input handed back as is.
    pub fn unchanged(input: Record, extra_input: Option<BlockEntity>, extra_needed: bool) -> Self {
        Self {
            output: input,
            extra_output: extra_input,
            extra_needed,
            cacheable: false,
        }
    }
}

pub struct TranslateRequest<'a> {
    pub input: &'a Record,
    pub input_spec: &'a Specification,
    pub rules: &'a [Rule],
    /// Where output specifications (defaults, templates) are looked up.
    pub output_version: &'a VersionData,
    pub force_blockstate: bool,
    pub functions: &'a FunctionRegistry,
    pub lookup: Option<&'a dyn BlockLookup>,
    /// The input block's block entity, when the caller already has it.
    pub extra_input: Option<&'a BlockEntity>,
    /// Start output trees from the specification template.
    pub pre_populate_defaults: bool,
    pub block_location: Option<BlockCoordinates>,
}

/// Run `request.rules` against the input and build the output record.
pub fn translate(request: &TranslateRequest<'_>) -> Result<Translation, TranslateError> {
    let location = request.block_location.unwrap_or((0, 0, 0));

    let fetched: BlockEntity;
    let (subject, nbt) = match request.input {
        Record::Block(block) => {
            let nbt = match (request.extra_input, &request.input_spec.nbt, request.lookup) {
                (Some(extra), _, _) => Some(&extra.nbt),
                (None, Some(template), Some(lookup)) => {
                    fetched = match lookup.block_at((0, 0, 0))?.1 {
                        Some(block_entity) => block_entity,
                        None => BlockEntity::new(
                            template.namespace.clone(),
                            template.base_name.clone(),
                            location,
                            NamedTag::new(template.outer_name.clone(), template.template.clone()),
                        ),
                    };
                    Some(&fetched.nbt)
                }
                _ => None,
            };
            (Subject::Block(block), nbt)
        }
        Record::Entity(entity) => {
            if request.extra_input.is_some() {
                return Err(TranslateError::EntityExtraInput);
            }
            (Subject::Entity(entity), Some(&entity.nbt))
        }
    };

    let mut state = State::default();
    Interpreter::new(request.functions, request.lookup).run(
        request.rules,
        &Frame::new(subject, nbt, location),
        &mut state,
    )?;

    let (Some(id), Some(kind)) = (state.output_id.as_deref(), state.output_kind) else {
        return Err(TranslateError::NoOutput);
    };
    let (namespace, base_name) = id
        .split_once(':')
        .ok_or_else(|| TranslateError::BadIdentifier(id.to_string()))?;
    let format = request.output_version.format_key(request.force_blockstate);

    match kind {
        OutputKind::Block => {
            let spec = request
                .output_version
                .block
                .specification(format, namespace, base_name)?;
            let mut properties = spec.default_properties.clone();
            properties.extend(state.properties);
            let output = Block::new(namespace, base_name, properties);

            let extra_output = match &spec.nbt {
                Some(template) => Some(BlockEntity::new(
                    template.namespace.clone(),
                    template.base_name.clone(),
                    location,
                    build_nbt(
                        &template.outer_name,
                        template.outer_kind,
                        &state.nbt,
                        request.pre_populate_defaults.then_some(&template.template),
                    ),
                )),
                None => {
                    if !state.nbt.is_empty() {
                        log::warn!(
                            "New nbt present but no output block entity\nin: {}\nout: {}",
                            request.input,
                            output
                        );
                    }
                    None
                }
            };
            Ok(Translation {
                output: Record::Block(output),
                extra_output,
                extra_needed: state.extra_needed,
                cacheable: state.cacheable,
            })
        }
        OutputKind::Entity => {
            let spec = request
                .output_version
                .entity
                .specification(format, namespace, base_name)?;
            let nbt = match &spec.nbt {
                Some(template) => build_nbt(
                    &template.outer_name,
                    template.outer_kind,
                    &state.nbt,
                    request.pre_populate_defaults.then_some(&template.template),
                ),
                None => build_nbt("", TagKind::Compound, &state.nbt, None),
            };
            let position = match request.input {
                Record::Entity(entity) => entity.location,
                Record::Block(_) => (
                    f64::from(location.0),
                    f64::from(location.1),
                    f64::from(location.2),
                ),
            };
            Ok(Translation {
                output: Record::Entity(Entity::new(namespace, base_name, position, nbt)),
                extra_output: None,
                extra_needed: state.extra_needed,
                cacheable: state.cacheable,
            })
        }
    }
}
