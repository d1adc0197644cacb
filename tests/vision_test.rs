use allten_nutrition_api::{
    config::VisionConfig,
    error::OracleError,
    oracle::{LabelOracle, VisionOracle},
};
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use serde_json::json;
use std::io::Cursor;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &str = include_str!("fixtures/service_account_key.pem");
const ACCESS_TOKEN: &str = "ya29.test-token";

fn oracle_for(server: &MockServer) -> VisionOracle {
    let credentials = json!({
        "type": "service_account",
        "client_email": "nutrition@allten-test.iam.gserviceaccount.com",
        "private_key": TEST_KEY,
        "token_uri": format!("{}/token", server.uri()),
    })
    .to_string();
    let config = VisionConfig {
        annotate_url: format!("{}/v1/images:annotate", server.uri()),
        ..VisionConfig::default()
    };
    VisionOracle::from_credentials_json(&credentials, &config).unwrap()
}

fn lunch_png() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([180, 120, 60])));
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
        .unwrap();
    png
}

async fn mount_token(server: &MockServer, expires_in: i64, times: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "expires_in": expires_in,
            "token_type": "Bearer"
        })))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_annotate(server: &MockServer, response: ResponseTemplate, times: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/images:annotate"))
        .and(header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

fn labels_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "responses": [{
            "labelAnnotations": [
                { "description": "Grilled chicken", "score": 0.94 },
                { "description": "Salad", "score": 0.77 }
            ]
        }]
    }))
}

#[tokio::test]
async fn detect_returns_parsed_labels() {
    let server = MockServer::start().await;
    mount_token(&server, 3600, 1).await;
    mount_annotate(&server, labels_response(), 1).await;

    let labels = oracle_for(&server).detect(&lunch_png()).await.unwrap();

    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0].description, "Grilled chicken");
    assert!((labels[0].score - 0.94).abs() < 1e-6);
    assert_eq!(labels[1].description, "Salad");
    server.verify().await;
}

#[tokio::test]
async fn access_token_is_reused_between_calls() {
    let server = MockServer::start().await;
    mount_token(&server, 3600, 1).await;
    mount_annotate(&server, labels_response(), 2).await;

    let oracle = oracle_for(&server);
    let image = lunch_png();
    oracle.detect(&image).await.unwrap();
    oracle.detect(&image).await.unwrap();

    server.verify().await;
}

#[tokio::test]
async fn token_inside_refresh_margin_is_exchanged_again() {
    let server = MockServer::start().await;
    // Shorter than the refresh margin, so it is stale as soon as it is cached.
    mount_token(&server, 30, 2).await;
    mount_annotate(&server, labels_response(), 2).await;

    let oracle = oracle_for(&server);
    let image = lunch_png();
    oracle.detect(&image).await.unwrap();
    oracle.detect(&image).await.unwrap();

    server.verify().await;
}

#[tokio::test]
async fn annotate_server_error_maps_to_status() {
    let server = MockServer::start().await;
    mount_token(&server, 3600, 1).await;
    mount_annotate(
        &server,
        ResponseTemplate::new(500).set_body_string("backend error"),
        1,
    )
    .await;

    let err = oracle_for(&server).detect(&lunch_png()).await.unwrap_err();

    match err {
        OracleError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "backend error");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn rejected_token_exchange_skips_annotate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_grant"))
        .expect(1)
        .mount(&server)
        .await;
    mount_annotate(&server, labels_response(), 0).await;

    let err = oracle_for(&server).detect(&lunch_png()).await.unwrap_err();

    assert!(matches!(err, OracleError::Status { status: 401, .. }));
    server.verify().await;
}

#[tokio::test]
async fn undecodable_image_never_reaches_the_network() {
    let server = MockServer::start().await;
    mount_token(&server, 3600, 0).await;
    mount_annotate(&server, labels_response(), 0).await;

    let err = oracle_for(&server)
        .detect(b"definitely not an image")
        .await
        .unwrap_err();

    assert!(matches!(err, OracleError::Image(_)));
    server.verify().await;
}
