#[cfg(test)]
mod tests {
    use crate::config::settings::Settings;

    #[test]
    fn test_defaults_load_without_files() {
        let settings = Settings::new().expect("defaults should load");

        assert_eq!(settings.database.path, "modscout.db");
        assert_eq!(settings.http.timeout_secs, 10);
        assert_eq!(settings.crawler.workers, 4);
        assert_eq!(settings.crawler.batch_size, 10);
        assert_eq!(settings.crawler.max_retries, 3);

        // Throttle defaults reflect public unauthenticated quotas
        assert_eq!(settings.throttle.github_delay_ms, 1200);
        assert_eq!(settings.throttle.gitlab_delay_ms, 500);
        assert_eq!(settings.throttle.gitea_delay_ms, 300);
    }
}
