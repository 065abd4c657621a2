use payrail::ClientConfig;
use payrail_http::ApiHandler;
use wiremock::MockServer;

pub fn handler_for(server: &MockServer) -> ApiHandler {
    let config = ClientConfig::new("sk_test_123").with_api_base(server.uri());
    ApiHandler::try_new(&config).unwrap()
}
