//! HTTP tests for the WALS router, driven through `tower::ServiceExt::oneshot`
//! against an in-memory catalog.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::too_many_lines)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;
use wals_db::{DataDump, MemoryCatalog};
use wals_web::{build_router, AppState, SiteConfig};

// =============================================================================
// Helpers
// =============================================================================

fn fixture() -> DataDump {
    serde_json::from_value(serde_json::json!({
        "families": [
            { "id": "indoeuropean", "name": "Indo-European" },
            { "id": "austronesian", "name": "Austronesian" }
        ],
        "genera": [
            { "id": "germanic", "name": "Germanic", "family_id": "indoeuropean", "icon": "cff6600" },
            { "id": "oceanic", "name": "Oceanic", "family_id": "austronesian", "icon": null }
        ],
        "languages": [
            { "id": "ger", "name": "German", "latitude": 52.0, "longitude": 10.0,
              "genus_id": "germanic", "iso_codes": ["deu"], "country_ids": ["DE"],
              "samples_100": true, "samples_200": true },
            { "id": "eng", "name": "English", "latitude": 52.0, "longitude": 0.0,
              "genus_id": "germanic", "iso_codes": ["eng"], "country_ids": ["GB"],
              "samples_100": true, "samples_200": true },
            { "id": "dut", "name": "Dutch", "latitude": 52.5, "longitude": 6.0,
              "genus_id": "germanic", "iso_codes": ["nld"], "country_ids": [],
              "samples_100": false, "samples_200": true },
            { "id": "fij", "name": "Fijian", "latitude": -17.8, "longitude": 178.0,
              "genus_id": "oceanic", "iso_codes": ["fij"], "country_ids": [],
              "samples_100": false, "samples_200": false }
        ],
        "countries": [
            { "id": "DE", "name": "Germany" },
            { "id": "GB", "name": "United Kingdom" }
        ],
        "parameters": [
            { "id": "1A", "name": "Consonant Inventories", "chapter_id": "1", "domain": [
                { "id": "1A-1", "parameter_id": "1A", "name": "Small", "number": 1, "icon": "cffffff" },
                { "id": "1A-3", "parameter_id": "1A", "name": "Average", "number": 3, "icon": "cff0000" }
            ] },
            { "id": "81A", "name": "Order of Subject, Object and Verb", "chapter_id": "81", "domain": [
                { "id": "81A-2", "parameter_id": "81A", "name": "SVO", "number": 2, "icon": "c0000dd" }
            ] }
        ],
        "valuesets": [
            { "id": "1A-eng", "parameter_id": "1A", "language_id": "eng",
              "values": [{ "id": "1A-eng", "domainelement_id": "1A-3" }],
              "updated": "2013-01-01T00:00:00Z" },
            { "id": "1A-ger", "parameter_id": "1A", "language_id": "ger",
              "values": [{ "id": "1A-ger", "domainelement_id": "1A-3" }],
              "updated": "2014-06-01T00:00:00Z" },
            { "id": "81A-eng", "parameter_id": "81A", "language_id": "eng",
              "values": [{ "id": "81A-eng", "domainelement_id": "81A-2" }],
              "updated": "2011-04-01T00:00:00Z" }
        ],
        "contributions": [
            { "id": "81", "name": "Order of Subject, Object and Verb",
              "contributor_ids": ["dryer"], "references": [] },
            { "id": "1", "name": "Consonant Inventories",
              "contributor_ids": ["maddieson"],
              "references": [{ "source_id": "Maddieson-1984", "description": "12-14" }] }
        ],
        "contributors": [
            { "id": "maddieson", "name": "Ian Maddieson", "url": null },
            { "id": "dryer", "name": "Matthew S. Dryer", "url": null }
        ],
        "sources": [
            { "id": "Maddieson-1984", "name": "Maddieson 1984", "description": "Patterns of Sounds",
              "author": "Maddieson, Ian", "year": "1984" }
        ],
        "sentences": [
            { "id": "1", "language_id": "ger", "name": "Ich sehe dich.",
              "analyzed": "Ich sehe dich", "gloss": "1SG see 2SG.ACC", "translation": "I see you." }
        ]
    }))
    .unwrap()
}

fn make_router() -> Router {
    let state = AppState::new(MemoryCatalog::new(fixture()), SiteConfig::default()).unwrap();
    build_router(Arc::new(state))
}

async fn get(path: &str) -> Response {
    make_router()
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_to_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_to_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

async fn assert_redirect(path: &str, to: &str) {
    let response = get(path).await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY, "{path}");
    assert_eq!(location(&response), to, "{path}");
}

// =============================================================================
// Legacy URLs
// =============================================================================

#[tokio::test]
async fn index_and_dotted_root_redirect_to_dataset() {
    assert_redirect("/index", "/").await;
    assert_redirect("/.rdf", "/void.rdf").await;
}

#[tokio::test]
async fn legacy_datapoint_appends_feature_suffix() {
    assert_redirect("/datapoint/1/wals_code_eng", "/valuesets/1A-eng").await;
    assert_redirect("/datapoint/81A/wals_code_eng", "/valuesets/81A-eng").await;
}

#[tokio::test]
async fn legacy_feature_description_redirects_to_chapter() {
    assert_redirect("/feature/description/81", "/chapter/81").await;
}

#[tokio::test]
async fn legacy_indexes_redirect_to_listings() {
    for path in ["/languoid/lect", "/languoid/family", "/languoid/genus"] {
        assert_redirect(path, "/languoid").await;
    }
    for path in ["/refdb/", "/refdb/record", "/refdb/record/", "/refdb/search"] {
        assert_redirect(path, "/refdb").await;
    }
}

#[tokio::test]
async fn legacy_rules_match_decoded_path() {
    assert_redirect("/datapoint/1%41/wals_code_eng", "/valuesets/1A-eng").await;
    assert_redirect("/feature/description/%381", "/chapter/81").await;
}

#[tokio::test]
async fn retired_endpoints_answer_gone() {
    for path in ["/languoid/osd.xml", "/experimental/clics"] {
        let response = get(path).await;
        assert_eq!(response.status(), StatusCode::GONE, "{path}");
        let json = body_to_json(response).await;
        assert_eq!(json["status"], 410);
    }
}

#[tokio::test]
async fn redirected_datapoint_resolves() {
    let response = get("/valuesets/1A-eng").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response).await;
    assert_eq!(json["language_url"], "/languoid/lect/wals_code_eng");
    assert_eq!(json["parameter_url"], "/feature/1A");
    assert_eq!(json["values"][0]["icon"], "/static/icons/cff0000.png");
}

// =============================================================================
// Context resolution
// =============================================================================

#[tokio::test]
async fn feature_without_suffix_redirects_to_chapter() {
    assert_redirect("/feature/81", "/chapter/81").await;
    assert_redirect("/feature/81.json", "/chapter/81").await;
}

#[tokio::test]
async fn feature_detail_lists_domain_with_icons() {
    let response = get("/feature/1A").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response).await;
    assert_eq!(json["chapter_url"], "/chapter/1");
    assert_eq!(json["domain"][1]["name"], "Average");
    assert_eq!(json["domain"][1]["icon"], "/static/icons/cff0000.png");
}

#[tokio::test]
async fn unknown_feature_is_not_found() {
    let response = get("/feature/999Z").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response).await;
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn chapter_detail_includes_references_with_sources() {
    let response = get("/chapter/1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response).await;
    assert_eq!(json["contributors"][0]["name"], "Ian Maddieson");
    assert_eq!(json["references"][0]["source"]["year"], "1984");
    assert_eq!(json["references"][0]["description"], "12-14");
}

// =============================================================================
// Samples
// =============================================================================

#[tokio::test]
async fn sample_100_lists_flagged_languages_by_name() {
    let response = get("/languoid/samples/100").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response).await;
    assert_eq!(json["name"], "100-language sample");
    let names: Vec<_> = json["languages"]["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row[0].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(names, vec!["English", "German"]);
}

#[tokio::test]
async fn sample_200_includes_more_languages() {
    let json = body_to_json(get("/languoid/samples/200").await).await;
    assert_eq!(json["languages"]["rows"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn unknown_sample_is_not_found() {
    for path in ["/languoid/samples/300", "/languoid/samples/abc", "/languoid/samples/100.rdf"] {
        assert_eq!(get(path).await.status(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn sample_map_uses_genus_icons() {
    let response = get("/languoid/samples/100.geojson").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/geo+json"
    );
    let json = body_to_json(response).await;
    assert_eq!(json["type"], "FeatureCollection");
    assert_eq!(json["features"].as_array().unwrap().len(), 2);
    assert_eq!(
        json["features"][0]["properties"]["icon"],
        "/static/icons/cff6600.png"
    );
}

// =============================================================================
// Maps and listings
// =============================================================================

#[tokio::test]
async fn feature_map_uses_value_icons() {
    let json = body_to_json(get("/feature/1A.geojson").await).await;
    assert_eq!(json["properties"]["map"], "feature");
    let features = json["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);
    for feature in features {
        assert_eq!(feature["properties"]["icon"], "/static/icons/cff0000.png");
    }
}

#[tokio::test]
async fn family_and_country_maps() {
    let json = body_to_json(get("/languoid/family/indoeuropean.geojson").await).await;
    assert_eq!(json["features"].as_array().unwrap().len(), 3);

    let json = body_to_json(get("/country/GB.geojson").await).await;
    assert_eq!(json["properties"]["name"], "United Kingdom");
    assert_eq!(json["features"][0]["properties"]["language"], "eng");
}

#[tokio::test]
async fn map_without_icon_omits_it() {
    let json = body_to_json(get("/languoid/family/austronesian.geojson").await).await;
    assert!(json["features"][0]["properties"].get("icon").is_none());
}

#[tokio::test]
async fn unsupported_representation_is_not_found() {
    for path in ["/feature/1A.rdf", "/valuesets/1A-eng.geojson", "/chapter/1.geojson"] {
        assert_eq!(get(path).await.status(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn language_detail_requires_wals_code_prefix() {
    let response = get("/languoid/lect/wals_code_eng").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response).await;
    assert_eq!(json["language"]["name"], "English");
    assert_eq!(json["family_url"], "/languoid/family/indoeuropean");
    assert_eq!(json["icon"], "/static/icons/cff6600.png");

    assert_eq!(get("/languoid/lect/eng").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listings_are_data_tables() {
    let json = body_to_json(get("/feature").await).await;
    assert_eq!(json["name"], "features");
    assert_eq!(json["rows"][0][0], "1A");
    assert_eq!(json["rows"][1][0], "81A");

    let json = body_to_json(get("/chapter").await).await;
    assert_eq!(json["name"], "chapters");
    assert_eq!(json["rows"][0][0], "1");

    let json = body_to_json(get("/values").await).await;
    assert_eq!(json["name"], "datapoints");
    assert_eq!(json["rows"].as_array().unwrap().len(), 3);

    let json = body_to_json(get("/languoid").await).await;
    assert_eq!(json["rows"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn feature_info_summarises_domain() {
    let json = body_to_json(get("/feature-info/81A").await).await;
    assert_eq!(json["chapter_url"], "/chapter/81");
    assert_eq!(json["values"][0]["icon"], "/static/icons/c0000dd.png");
}

// =============================================================================
// Site pages
// =============================================================================

#[tokio::test]
async fn home_page_renders_menu_in_order() {
    let response = get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_to_string(response).await;
    let positions: Vec<_> = [
        "menuitem_dataset",
        "menuitem_parameters",
        "menuitem_contributions",
        "menuitem_languages",
        "menuitem_sources",
        "menuitem_contributors",
        "menuitem_blog",
    ]
    .iter()
    .map(|id| html.find(id).unwrap())
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(html.contains("http://blog.wals.info/category/news/"));
}

#[tokio::test]
async fn void_json_counts_resources() {
    let json = body_to_json(get("/void.json").await).await;
    assert_eq!(json["counts"]["languages"], 4);
    assert_eq!(json["counts"]["features"], 2);
    assert_eq!(get("/void.rdf").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get("/whatever").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sitemap_index_lists_one_sitemap_per_resource_kind() {
    let response = get("/sitemap.xml").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/xml; charset=utf-8"
    );
    let xml = body_to_string(response).await;
    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    for rsc in ["contribution", "parameter", "source", "sentence", "valueset"] {
        assert!(xml.contains(&format!("<loc>/sitemap.{rsc}.0.xml</loc>")), "{rsc}");
    }
    assert!(!xml.contains("sitemap.language"));
}

#[tokio::test]
async fn sitemap_lists_resource_urls() {
    let xml = body_to_string(get("/sitemap.valueset.0.xml").await).await;
    assert!(xml.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
    for id in ["1A-eng", "1A-ger", "81A-eng"] {
        assert!(xml.contains(&format!("<url><loc>/valuesets/{id}</loc></url>")), "{id}");
    }

    let xml = body_to_string(get("/sitemap.contribution.0.xml").await).await;
    assert!(xml.contains("<loc>/chapter/1</loc>"));
    assert!(xml.contains("<loc>/chapter/81</loc>"));
}

#[tokio::test]
async fn unknown_sitemaps_are_not_found() {
    for path in ["/sitemap.language.0.xml", "/sitemap.valueset.1.xml", "/sitemap.valueset.x.xml"] {
        assert_eq!(get(path).await.status(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn genealogy_counts_languages_per_genus() {
    let json = body_to_json(get("/languoid/genealogy").await).await;
    let families = json.as_array().unwrap();
    assert_eq!(families[0]["name"], "Austronesian");
    assert_eq!(families[1]["genera"][0]["languages"], 3);
}

#[tokio::test]
async fn changes_lists_newest_first() {
    let json = body_to_json(get("/changes").await).await;
    assert_eq!(json[0]["id"], "1A-ger");
    assert_eq!(json[0]["url"], "/valuesets/1A-ger");
}

#[tokio::test]
async fn oai_identify_and_bad_verb() {
    let response = get("/languoid/oai?verb=Identify").await;
    assert_eq!(response.status(), StatusCode::OK);
    let xml = body_to_string(response).await;
    assert!(xml.contains("<protocolVersion>2.0</protocolVersion>"));
    assert!(xml.contains("<baseURL>/languoid/oai</baseURL>"));

    let xml = body_to_string(get("/refdb_oai?verb=Frobnicate").await).await;
    assert!(xml.contains(r#"code="badVerb""#));
}

#[tokio::test]
async fn credits_list_authors() {
    let html = body_to_string(get("/about/credits").await).await;
    assert!(html.contains(r#"<a href="/author/maddieson">Ian Maddieson</a>"#));
}

#[tokio::test]
async fn unknown_path_is_json_not_found() {
    let response = get("/no/such/page").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response).await;
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn public_url_prefixes_redirects() {
    let site = SiteConfig {
        public_url: String::from("https://wals.info"),
        ..SiteConfig::default()
    };
    let state = AppState::new(MemoryCatalog::new(fixture()), site).unwrap();
    let response = build_router(Arc::new(state))
        .oneshot(Request::get("/feature/81").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), "https://wals.info/chapter/81");
}
