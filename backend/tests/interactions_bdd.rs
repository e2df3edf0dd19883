//! Behavioural tests for likes, favourites, comments and tags.
#[path = "support/gallery_http.rs"]
mod gallery_http;

use actix_web::test as actix_test;
use gallery_http::{GalleryWorld, WorldFixture};
use pawprint::domain::ports::Relation;
use pawprint::outbound::store::RowPolicy;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::json;

#[fixture]
fn world() -> WorldFixture {
    WorldFixture::new(GalleryWorld::with_policy(RowPolicy::OPEN))
}

#[given("an open gallery store")]
fn an_open_gallery_store(world: &WorldFixture) {
    world.reset(GalleryWorld::with_policy(RowPolicy::OPEN));
}

#[when("user {user} toggles their like on design {design}")]
fn user_toggles_their_like(world: &WorldFixture, user: String, design: String) {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/likes")
        .set_json(json!({ "userId": user, "designId": design }));
    world.world_mut().send(request);
}

#[when("user {user} favourites design {design}")]
fn user_favourites_design(world: &WorldFixture, user: String, design: String) {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/favorites")
        .set_json(json!({ "userId": user, "designId": design }));
    world.world_mut().send(request);
}

#[when("user {user} comments {content} on design {design}")]
fn user_comments_on_design(world: &WorldFixture, user: String, content: String, design: String) {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/comments")
        .set_json(json!({ "userId": user, "designId": design, "content": content }));
    world.world_mut().send(request);
}

#[when("mixed-case duplicate tags are saved for design {design}")]
fn mixed_case_duplicate_tags_are_saved(world: &WorldFixture, design: String) {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/tags")
        .set_json(json!({ "designId": design, "tags": [" Cat ", "cat", "Night"] }));
    world.world_mut().send(request);
}

#[when("the tags of design {design} are listed")]
fn the_tags_of_design_are_listed(world: &WorldFixture, design: String) {
    let request = actix_test::TestRequest::get().uri(&format!("/api/v1/tags?designId={design}"));
    world.world_mut().send(request);
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &WorldFixture, status: u16) {
    assert_eq!(world.world().status().as_u16(), status);
}

#[then("the design has {count} likes and the user likes it")]
fn the_design_is_liked(world: &WorldFixture, count: u64) {
    assert_eq!(
        world.world().body(),
        &json!({ "likesCount": count, "liked": true })
    );
}

#[then("the design has {count} likes and the user does not like it")]
fn the_design_is_not_liked(world: &WorldFixture, count: u64) {
    assert_eq!(
        world.world().body(),
        &json!({ "likesCount": count, "liked": false })
    );
}

#[then("the favourite is transient")]
fn the_favourite_is_transient(world: &WorldFixture) {
    let world = world.world();
    assert_eq!(world.body()["isTemp"], json!(true));
    assert_eq!(world.body()["alreadyFavorited"], json!(false));
}

#[then("the design is reported as already favourited")]
fn the_design_is_already_favourited(world: &WorldFixture) {
    assert_eq!(world.world().body()["alreadyFavorited"], json!(true));
}

#[then("no favourites are persisted")]
fn no_favourites_are_persisted(world: &WorldFixture) {
    assert!(world.world().store.rows(Relation::Favorites).is_empty());
}

#[then("the comment is transient")]
fn the_comment_is_transient(world: &WorldFixture) {
    let world = world.world();
    assert_eq!(world.body()["isTemp"], json!(true));
    assert_eq!(world.body()["comment"]["content"], json!("Lovely"));
}

#[then("no comments are persisted")]
fn no_comments_are_persisted(world: &WorldFixture) {
    assert!(world.world().store.rows(Relation::Comments).is_empty());
}

#[then("the tags are cat and night")]
fn the_tags_are_cat_and_night(world: &WorldFixture) {
    assert_eq!(world.world().body(), &json!({ "tags": ["cat", "night"] }));
}

#[scenario(
    path = "tests/features/interactions.feature",
    name = "Toggling a like twice restores the count"
)]
fn toggling_a_like_twice(world: WorldFixture) {
    let _ = world;
}

#[scenario(
    path = "tests/features/interactions.feature",
    name = "A transient user's favourite is kept without persisting it"
)]
fn transient_favourite_is_not_persisted(world: WorldFixture) {
    let _ = world;
}

#[scenario(
    path = "tests/features/interactions.feature",
    name = "A transient user's comment is echoed but not stored"
)]
fn transient_comment_is_not_stored(world: WorldFixture) {
    let _ = world;
}

#[scenario(
    path = "tests/features/interactions.feature",
    name = "Tags are normalised before they replace the design's set"
)]
fn tags_are_normalised(world: WorldFixture) {
    let _ = world;
}
