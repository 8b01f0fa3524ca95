mod harness;

use std::io::Write;

use devgate_config::Config;
use harness::mock_upstream::MockUpstream;
use harness::server::TestServer;

fn load(contents: &str) -> Config {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    Config::load(file.path()).unwrap()
}

#[tokio::test]
async fn rules_from_file_match_in_declaration_order() {
    let v2 = MockUpstream::start().await.unwrap();
    let api = MockUpstream::start().await.unwrap();

    let config = load(&format!(
        r#"
        [server]
        root = "/nonexistent/devgate-test-root"

        [server.proxy."/api/v2"]
        target = "{v2}"

        [server.proxy."/api"]
        target = "{api}"
        rewrite = {{ pattern = "^/api", replacement = "" }}
        "#,
        v2 = v2.base_url(),
        api = api.base_url(),
    ));

    let contexts: Vec<_> = config.server.proxy.keys().map(String::as_str).collect();
    assert_eq!(contexts, ["/api/v2", "/api"]);

    let server = TestServer::start(config).await.unwrap();

    server.client().get(server.url("/api/v2/items")).send().await.unwrap();
    server.client().get(server.url("/api/v1/items")).send().await.unwrap();

    assert_eq!(v2.single_request().path, "/api/v2/items");
    assert_eq!(api.single_request().path, "/v1/items");
}
