use std::time::Duration;

use cnweather_core::{
    FallbackRouter, ProviderId, ReferenceData, WeatherProvider,
    geocode::{Geocoder, NominatimGeocoder},
    model::{Coordinates, SubstitutionReason},
    provider::{
        ProviderQuery, amap::AMapWeatherProvider, http_client, open_meteo::OpenMeteoProvider,
        qweather::QWeatherProvider, weather_com_cn::WeatherComCnProvider, wttr::WttrProvider,
    },
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

fn client() -> reqwest::Client {
    http_client(Duration::from_secs(2)).unwrap()
}

fn code_query(code: &str, label: &str) -> ProviderQuery {
    ProviderQuery::CityCode { code: code.to_string(), label: label.to_string() }
}

const HANGZHOU_SK: &str = r#"var dataSK={"cityname":"杭州","city":"101210101","temp":"18","WD":"东风","WS":"2级","SD":"60%","time":"14:20","weather":"多云"}"#;

#[tokio::test]
async fn weather_com_cn_primary_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sk_2d/101210101.html"))
        .and(header("referer", "http://www.weather.com.cn/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HANGZHOU_SK))
        .expect(1)
        .mount(&server)
        .await;

    let provider = WeatherComCnProvider::new(client()).with_base_urls(server.uri(), server.uri());
    let report = provider.query(&code_query("101210101", "杭州")).await.unwrap();

    assert_eq!(report.provider, ProviderId::WeatherComCn);
    assert_eq!(report.to_string(), "杭州: 多云 18°C 更新时间:14:20 湿度:60% 风力:2级 风向:东风");
}

#[tokio::test]
async fn weather_com_cn_retries_legacy_endpoint() {
    let server = MockServer::start().await;
    Mock::given(path("/sk_2d/101010100.html"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/data/sk/101010100.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"weatherinfo":{"city":"北京","cityid":"101010100","temp":"25","WD":"南风","WS":"2级","SD":"30%","time":"17:05"}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let provider = WeatherComCnProvider::new(client()).with_base_urls(server.uri(), server.uri());
    let report = provider.query(&code_query("101010100", "北京")).await.unwrap();

    assert_eq!(report.place_label, "北京");
    assert_eq!(report.temperature_celsius, 25.0);
}

#[tokio::test]
async fn weather_com_cn_gives_up_after_legacy_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let provider = WeatherComCnProvider::new(client()).with_base_urls(server.uri(), server.uri());
    assert!(provider.query(&code_query("101210301", "嘉兴")).await.is_none());
    assert!(provider.query(&ProviderQuery::Text("嘉兴".into())).await.is_none());
}

#[tokio::test]
async fn wttr_custom_format() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/London"))
        .and(query_param("format", "%l|%C|%t|%h|%w"))
        .respond_with(ResponseTemplate::new(200).set_body_string("London|Partly cloudy|+14°C|72%|↙9km/h\n"))
        .mount(&server)
        .await;

    let provider = WttrProvider::new(client()).with_base_url_opt(Some(server.uri()));
    let report = provider.query(&ProviderQuery::Text("London".into())).await.unwrap();

    assert_eq!(report.description, "多云");
    assert_eq!(report.temperature_celsius, 14.0);
}

#[tokio::test]
async fn wttr_unknown_location_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Unknown location; please try ~0,0"))
        .mount(&server)
        .await;

    let provider = WttrProvider::new(client()).with_base_url_opt(Some(server.uri()));
    assert!(provider.query(&ProviderQuery::Text("Atlantis".into())).await.is_none());
}

#[tokio::test]
async fn open_meteo_current_weather() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("current_weather", "true"))
        .and(query_param("windspeed_unit", "kmh"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"current_weather":{"time":"2024-03-01T14:00","temperature":3.5,"windspeed":20.1,"winddirection":10,"weathercode":71}}"#,
        ))
        .mount(&server)
        .await;

    let provider = OpenMeteoProvider::new(client()).with_base_url_opt(Some(server.uri()));
    let query = ProviderQuery::Coordinates {
        coordinates: Coordinates::new(59.91, 10.75).unwrap(),
        label: "Oslo".into(),
    };
    let report = provider.query(&query).await.unwrap();

    assert_eq!(report.place_label, "Oslo");
    assert_eq!(report.description, "小雪");
    assert!(report.observed_at.is_some());
}

#[tokio::test]
async fn qweather_sends_key_and_lon_lat() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather/now"))
        .and(query_param("key", "QKEY"))
        .and(query_param("location", "121.47,31.23"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"code":"200","now":{"temp":"8","text":"小雨","windDir":"东风","windScale":"2","humidity":"90"}}"#,
        ))
        .mount(&server)
        .await;

    let provider =
        QWeatherProvider::new(client(), "QKEY".into()).with_base_url_opt(Some(server.uri()));
    let query = ProviderQuery::Coordinates {
        coordinates: Coordinates::new(31.23, 121.47).unwrap(),
        label: "上海".into(),
    };
    let report = provider.query(&query).await.unwrap();

    assert_eq!(report.provider, ProviderId::QWeather);
    assert_eq!(report.description, "小雨");
}

#[tokio::test]
async fn amap_resolves_adcode_then_weather() {
    let server = MockServer::start().await;
    Mock::given(path("/config/district"))
        .and(query_param("key", "AKEY"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"status":"1","districts":[{"adcode":"330400","name":"嘉兴市"}]}"#,
        ))
        .mount(&server)
        .await;
    Mock::given(path("/weather/weatherInfo"))
        .and(query_param("city", "330400"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"status":"1","lives":[{"city":"嘉兴市","weather":"晴","temperature":"20","winddirection":"北","windpower":"≤3","humidity":"55","reporttime":"2024-03-01 14:00:00"}]}"#,
        ))
        .mount(&server)
        .await;

    let provider =
        AMapWeatherProvider::new(client(), "AKEY".into()).with_base_url_opt(Some(server.uri()));
    let report = provider.query(&ProviderQuery::Text("嘉兴".into())).await.unwrap();

    assert_eq!(report.place_label, "嘉兴市");
    assert_eq!(report.temperature_celsius, 20.0);
}

#[tokio::test]
async fn nominatim_geocodes_first_result() {
    let server = MockServer::start().await;
    Mock::given(path("/search"))
        .and(query_param("q", "Paris"))
        .and(query_param("limit", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"[{"lat":"48.8566","lon":"2.3522"}]"#),
        )
        .mount(&server)
        .await;

    let geocoder = NominatimGeocoder::new(client()).with_base_url_opt(Some(server.uri()));
    let coordinates = geocoder.geocode("Paris").await.unwrap();
    assert_eq!(coordinates.to_string(), "48.8566,2.3522");

    assert!(geocoder.geocode("Nowhere").await.is_none());
}

#[tokio::test]
async fn router_falls_back_to_capital_over_http() {
    let server = MockServer::start().await;
    Mock::given(path("/sk_2d/101210101.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HANGZHOU_SK))
        .mount(&server)
        .await;

    let provider = WeatherComCnProvider::new(client()).with_base_urls(server.uri(), server.uri());
    let router = FallbackRouter::new(ReferenceData::embedded()).with_provider(Box::new(provider));

    let outcome = router.route("浙江嘉兴").await;
    let routed = outcome.report().expect("capital should resolve");

    assert_eq!(routed.location.substitution_reason, SubstitutionReason::ProvinceCapital);
    assert!(outcome.to_string().starts_with("[浙江嘉兴 天气暂无，显示浙江省会 杭州] 杭州: 多云 18°C"));
}
