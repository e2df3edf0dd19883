//! Behavioural tests for design persistence and listing fallbacks.
#[path = "support/gallery_http.rs"]
mod gallery_http;

use actix_web::test as actix_test;
use gallery_http::{GalleryWorld, WorldFixture};
use pawprint::outbound::store::RowPolicy;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

#[fixture]
fn world() -> WorldFixture {
    WorldFixture::new(GalleryWorld::with_policy(RowPolicy::OPEN))
}

#[given("a gallery store with a strict row policy")]
fn a_gallery_store_with_a_strict_row_policy(world: &WorldFixture) {
    world.reset(GalleryWorld::with_policy(RowPolicy::STRICT));
}

#[given("an unavailable gallery store")]
fn an_unavailable_gallery_store(world: &WorldFixture) {
    world.world().store.set_unavailable(true);
}

#[when("user {user} saves a vector design titled {title}")]
fn user_saves_a_vector_design(world: &WorldFixture, user: String, title: String) {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/designs")
        .set_json(json!({
            "title": title,
            "user_id": user,
            "design_type": "svg",
            "components": { "body": "round", "ears": "pointy" },
            "is_public": true
        }));
    world.world_mut().send(request);
}

#[when("user {user} lists their designs")]
fn user_lists_their_designs(world: &WorldFixture, user: String) {
    let request = actix_test::TestRequest::get().uri(&format!("/api/v1/designs?userId={user}"));
    world.world_mut().send(request);
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &WorldFixture, status: u16) {
    assert_eq!(world.world().status().as_u16(), status);
}

#[then("the error code is {code}")]
fn the_error_code_is(world: &WorldFixture, code: String) {
    assert_eq!(world.world().body()["code"], json!(code));
}

fn listed_titles(world: &WorldFixture) -> Vec<String> {
    let world = world.world();
    world.body()["designs"]
        .as_array()
        .expect("designs array")
        .iter()
        .filter_map(|design| design["title"].as_str().map(str::to_owned))
        .collect()
}

#[then("the listing contains {title}")]
fn the_listing_contains(world: &WorldFixture, title: String) {
    assert_eq!(listed_titles(world), vec![title]);
}

#[then("the listing is empty")]
fn the_listing_is_empty(world: &WorldFixture) {
    assert_eq!(world.world().body()["designs"], Value::Array(Vec::new()));
}

#[scenario(
    path = "tests/features/design_fallback.feature",
    name = "A design hidden by the row policy is still listed for its owner"
)]
fn hidden_design_is_listed_for_its_owner(world: WorldFixture) {
    let _ = world;
}

#[scenario(
    path = "tests/features/design_fallback.feature",
    name = "An unavailable store fails creation loudly"
)]
fn unavailable_store_fails_creation(world: WorldFixture) {
    let _ = world;
}

#[scenario(
    path = "tests/features/design_fallback.feature",
    name = "An unavailable store still serves an empty listing"
)]
fn unavailable_store_serves_empty_listing(world: WorldFixture) {
    let _ = world;
}
