use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct TranslationMetrics {
    // Interpreter runs
    pub total_translations: AtomicUsize,
    pub total_translation_time_us: AtomicU64,
    pub max_translation_time_us: AtomicU64,

    // Outcomes
    pub total_missing_specifications: AtomicUsize,
    pub total_failures: AtomicUsize,
    pub total_extra_needed: AtomicUsize,

    // Cache
    pub total_cache_hits: AtomicUsize,
    pub total_cache_misses: AtomicUsize,

    // Loading
    pub versions_loaded: AtomicUsize,
    pub total_load_time_us: AtomicU64,

    // Session
    pub start_time: Option<Instant>,
    pub config_summary: String,
}

impl TranslationMetrics {
    pub fn new(config_summary: String) -> Self {
        Self {
            start_time: Some(Instant::now()),
            config_summary,
            ..Default::default()
        }
    }

    pub fn record_translation(&self, duration: Duration) {
        self.total_translations.fetch_add(1, Ordering::Relaxed);
        let us = duration.as_micros() as u64;
        self.total_translation_time_us.fetch_add(us, Ordering::Relaxed);
        self.max_translation_time_us.fetch_max(us, Ordering::Relaxed);
    }

    pub fn record_missing_specification(&self) {
        self.total_missing_specifications.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.total_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_extra_needed(&self) {
        self.total_extra_needed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.total_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.total_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_version_load(&self, duration: Duration) {
        self.versions_loaded.fetch_add(1, Ordering::Relaxed);
        self.total_load_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn cache_hit_rate(&self) -> f64 {
        let hits = self.total_cache_hits.load(Ordering::Relaxed);
        let misses = self.total_cache_misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total > 0 { (hits as f64 / total as f64) * 100.0 } else { 0.0 }
    }

    pub fn generate_report(&self) -> String {
        let uptime = self.start_time.unwrap_or_else(Instant::now).elapsed();
        let translations = self.total_translations.load(Ordering::Relaxed);
        let time_total = self.total_translation_time_us.load(Ordering::Relaxed) as f64 / 1000.0; // ms
        let time_max = self.max_translation_time_us.load(Ordering::Relaxed) as f64 / 1000.0; // ms
        let time_avg = if translations > 0 { time_total / translations as f64 } else { 0.0 };

        let missing = self.total_missing_specifications.load(Ordering::Relaxed);
        let failures = self.total_failures.load(Ordering::Relaxed);
        let extra_needed = self.total_extra_needed.load(Ordering::Relaxed);

        let hits = self.total_cache_hits.load(Ordering::Relaxed);
        let misses = self.total_cache_misses.load(Ordering::Relaxed);

        let loaded = self.versions_loaded.load(Ordering::Relaxed);
        let load_time = self.total_load_time_us.load(Ordering::Relaxed) as f64 / 1000.0;

        format!(
            "Translation Report\n\
             ==================\n\
             Configuration: {}\n\
             Session Duration: {:.2?}\n\n\
             [Loading]\n\
             Versions Loaded: {}\n\
             Total Time: {:.2} ms\n\n\
             [Translation]\n\
             Translations: {}\n\
             Total Time: {:.2} ms\n\
             Avg Time: {:.3} ms/record\n\
             Max Time: {:.3} ms\n\
               - Missing Specifications: {}\n\
               - Failures: {}\n\
               - Extra Data Needed: {}\n\n\
             [Cache]\n\
             Hits: {}\n\
             Misses: {}\n\
             Hit Rate: {:.1}%\n",
            self.config_summary,
            uptime,
            loaded, load_time,
            translations, time_total, time_avg, time_max,
            missing, failures, extra_needed,
            hits, misses, self.cache_hit_rate()
        )
    }
}
