#[cfg(test)]
mod tests {
    use crate::config::settings::{HttpSettings, ThrottleSettings};
    use crate::domain::models::host::HostType;
    use crate::hosting::gitlab::GitLabClient;
    use crate::hosting::http::ProviderHttp;
    use crate::hosting::throttle::ProviderThrottle;
    use crate::hosting::traits::RepositoryClient;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> GitLabClient {
        let throttle = Arc::new(ProviderThrottle::new(&ThrottleSettings {
            github_delay_ms: 0,
            gitlab_delay_ms: 0,
            gitea_delay_ms: 0,
        }));
        let http = Arc::new(
            ProviderHttp::new(
                &HttpSettings {
                    timeout_secs: 5,
                    user_agent: "modscout-test".to_string(),
                },
                throttle,
            )
            .unwrap(),
        );
        GitLabClient::from_url(
            &format!("{}/owner/repo", base_url),
            HostType::GitLabSelfHosted,
            http,
        )
        .unwrap()
    }

    const RAW_PATH: &str = "/api/v4/projects/owner%2Frepo/repository/files/mod.conf/raw";

    #[tokio::test]
    async fn test_raw_text_file_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RAW_PATH))
            .and(query_param("ref", "main"))
            .respond_with(ResponseTemplate::new(200).set_body_string("name = foo"))
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let content = client.get_file("mod.conf", Some("main")).await.unwrap();
        assert_eq!(content.as_deref(), Some("name = foo"));
    }

    #[tokio::test]
    async fn test_raw_binary_file_is_treated_as_absent() {
        let server = MockServer::start().await;
        // 0xFF 0xFE is not valid UTF-8
        Mock::given(method("GET"))
            .and(path(RAW_PATH))
            .and(query_param("ref", "main"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFFu8, 0xFE, 0x00]))
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let content = client.get_file("mod.conf", Some("main")).await.unwrap();
        assert_eq!(content, None);
    }

    #[tokio::test]
    async fn test_missing_raw_file_is_none() {
        let server = MockServer::start().await;

        let client = client(&server.uri());
        let content = client.get_file("mod.conf", Some("main")).await.unwrap();
        assert_eq!(content, None);
    }
}
