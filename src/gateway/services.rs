// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Typed domain calls over [`BearerClient`].
//!
//! Responses the server only relays are returned as [`Value`]; records the
//! crate works with are decoded into their models.

use axum::body::Bytes;
use serde::Serialize;
use serde_json::{json, Value};

use super::{
    bearer::BearerClient,
    client::{BackendRequest, GatewayError, MultipartField},
};
use crate::models::{
    AdoptionPost, AdoptionPostRequest, ApprovePaymentRequest, ChatRoomRequest, CommentRequest,
    CursorPage, CursorQuery, DonationPostRequest, MakeDonationRequest, Pet, PreparePaymentRequest,
    StoryRequest,
};

/// An uploaded image, e.g. a noseprint photo.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    fn field(&self, name: &str) -> MultipartField {
        MultipartField::File {
            name: name.to_string(),
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            bytes: self.bytes.clone(),
        }
    }
}

/// Pet registration with its noseprint; sent as multipart form fields.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPet {
    pub pet_name: String,
    pub breed: String,
    pub species: String,
    pub old: Option<u32>,
    pub weight: Option<f64>,
    pub gender: Option<String>,
    pub color: Option<String>,
    pub feature: Option<String>,
    pub neutered: Option<bool>,
    pub nose_image: ImageUpload,
}

impl NewPet {
    fn fields(&self) -> Vec<MultipartField> {
        let text = |name: &str, value: String| MultipartField::Text {
            name: name.to_string(),
            value,
        };

        let mut fields = vec![
            text("petName", self.pet_name.clone()),
            text("breed", self.breed.clone()),
            text("species", self.species.clone()),
        ];
        let optional = [
            ("old", self.old.map(|v| v.to_string())),
            ("weight", self.weight.map(|v| v.to_string())),
            ("gender", self.gender.clone()),
            ("color", self.color.clone()),
            ("feature", self.feature.clone()),
            ("neutered", self.neutered.map(|v| v.to_string())),
        ];
        fields.extend(
            optional
                .into_iter()
                .filter_map(|(name, value)| value.map(|value| text(name, value))),
        );
        fields.push(self.nose_image.field("noseImage"));
        fields
    }
}

/// Filters for the adoption listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdoptionFilter {
    pub status: Option<String>,
    pub breed: Option<String>,
    pub region: Option<String>,
    pub district: Option<String>,
}

fn with_cursor(request: BackendRequest, key: &str, page: CursorQuery) -> BackendRequest {
    request
        .query_opt(key, page.cursor)
        .query_opt("size", page.size)
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, GatewayError> {
    Ok(serde_json::to_value(value)?)
}

// =============================================================================
// Pets
// =============================================================================

impl BearerClient {
    pub async fn my_pets(&self) -> Result<Vec<Pet>, GatewayError> {
        self.get(BackendRequest::get("/api/pet")).await
    }

    pub async fn pet_by_did(&self, pet_did: &str) -> Result<Pet, GatewayError> {
        self.get(BackendRequest::get(format!("/api/pet/{}", pet_did)))
            .await
    }

    /// Returns `{petDID, vcJwt}`.
    pub async fn register_pet(&self, pet: &NewPet) -> Result<Value, GatewayError> {
        self.call(BackendRequest::post("/pet/register").multipart(pet.fields()))
            .await
    }

    pub async fn prepare_transfer(
        &self,
        pet_did: &str,
        new_owner_address: &str,
    ) -> Result<Value, GatewayError> {
        self.call(
            BackendRequest::post(format!("/pet/{}/transfer/prepare", pet_did))
                .json(json!({ "newOwnerAddress": new_owner_address })),
        )
        .await
    }

    /// Noseprint check for a pending transfer. Returns `{verified, similarity}`.
    pub async fn verify_transfer(
        &self,
        pet_did: &str,
        transfer_id: &str,
        nose_image: &ImageUpload,
    ) -> Result<Value, GatewayError> {
        let fields = vec![
            MultipartField::Text {
                name: "transferId".into(),
                value: transfer_id.to_string(),
            },
            nose_image.field("noseImage"),
        ];
        self.call(BackendRequest::post(format!("/pet/{}/transfer/verify", pet_did)).multipart(fields))
            .await
    }

    pub async fn accept_transfer(
        &self,
        pet_did: &str,
        transfer_id: &str,
    ) -> Result<Value, GatewayError> {
        self.call(
            BackendRequest::post(format!("/pet/{}/transfer/accept", pet_did))
                .json(json!({ "transferId": transfer_id })),
        )
        .await
    }

    pub async fn transfer_history(&self, pet_did: &str) -> Result<Vec<Value>, GatewayError> {
        self.get(BackendRequest::get(format!("/pet/{}/transfers", pet_did)))
            .await
    }
}

// =============================================================================
// Adoption
// =============================================================================

impl BearerClient {
    pub async fn adoptions(
        &self,
        page: CursorQuery,
        filter: &AdoptionFilter,
    ) -> Result<CursorPage<AdoptionPost>, GatewayError> {
        let request = with_cursor(BackendRequest::get("/api/adoption"), "cursor", page)
            .query_opt("status", filter.status.as_deref())
            .query_opt("breed", filter.breed.as_deref())
            .query_opt("region", filter.region.as_deref())
            .query_opt("district", filter.district.as_deref());
        self.get(request).await
    }

    pub async fn adoption_detail(&self, adopt_id: i64) -> Result<AdoptionPost, GatewayError> {
        self.get(BackendRequest::get("/api/adoption/detail").query("adoptId", adopt_id))
            .await
    }

    /// Returns `{featured, recent}`.
    pub async fn adoption_home(&self) -> Result<Value, GatewayError> {
        self.call(BackendRequest::get("/api/adoption/home")).await
    }

    pub async fn create_adoption_post(
        &self,
        post: &AdoptionPostRequest,
    ) -> Result<Value, GatewayError> {
        self.call(BackendRequest::post("/api/adoption/post").json(to_json(post)?))
            .await
    }
}

// =============================================================================
// Stories, likes and comments
// =============================================================================

/// Which story board a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryKind {
    Daily,
    Review,
}

impl StoryKind {
    pub fn base(self) -> &'static str {
        match self {
            StoryKind::Daily => "/api/story/daily",
            StoryKind::Review => "/api/story/review",
        }
    }

    fn listing(self) -> &'static str {
        match self {
            StoryKind::Daily => "/api/story/daily/stories",
            StoryKind::Review => "/api/story/review/reviews",
        }
    }
}

impl BearerClient {
    /// `adopt_id` applies to reviews only.
    pub async fn create_story(
        &self,
        kind: StoryKind,
        story: &StoryRequest,
        adopt_id: Option<i64>,
    ) -> Result<Value, GatewayError> {
        let mut body = to_json(story)?;
        if let (StoryKind::Review, Some(adopt_id), Some(object)) =
            (kind, adopt_id, body.as_object_mut())
        {
            object.insert("adoptId".into(), json!(adopt_id));
        }
        self.call(BackendRequest::post(kind.base()).json(body)).await
    }

    pub async fn stories(&self, kind: StoryKind, page: CursorQuery) -> Result<Value, GatewayError> {
        self.call(with_cursor(BackendRequest::get(kind.listing()), "cursorId", page))
            .await
    }

    pub async fn story(&self, kind: StoryKind, story_id: i64) -> Result<Value, GatewayError> {
        self.call(BackendRequest::get(format!("{}/{}", kind.base(), story_id)))
            .await
    }

    pub async fn search_stories(
        &self,
        kind: StoryKind,
        keyword: &str,
        page: CursorQuery,
    ) -> Result<Value, GatewayError> {
        let request = BackendRequest::get(format!("{}/search", kind.base())).query("keyword", keyword);
        self.call(with_cursor(request, "cursorId", page)).await
    }

    /// Returns `{isLiked, likeCount}`.
    pub async fn toggle_like(&self, story_id: i64) -> Result<Value, GatewayError> {
        self.call(BackendRequest::post("/api/like").query("storyId", story_id))
            .await
    }

    pub async fn comments(&self, story_id: i64, page: CursorQuery) -> Result<Value, GatewayError> {
        let request = BackendRequest::get("/api/comment").query("storyId", story_id);
        self.call(with_cursor(request, "cursor", page)).await
    }

    pub async fn write_comment(&self, comment: &CommentRequest) -> Result<Value, GatewayError> {
        self.call(BackendRequest::post("/api/comment").json(to_json(comment)?))
            .await
    }
}

// =============================================================================
// Donations and payment
// =============================================================================

impl BearerClient {
    pub async fn create_donation_post(
        &self,
        post: &DonationPostRequest,
    ) -> Result<Value, GatewayError> {
        self.call(BackendRequest::post("/api/donation/posts").json(to_json(post)?))
            .await
    }

    pub async fn donations(
        &self,
        page: CursorQuery,
        breed: Option<&str>,
        status: Option<&str>,
    ) -> Result<Value, GatewayError> {
        let request = with_cursor(BackendRequest::get("/api/donation/list"), "cursor", page)
            .query_opt("breed", breed)
            .query_opt("status", status);
        self.call(request).await
    }

    pub async fn closing_donations(&self) -> Result<Value, GatewayError> {
        self.call(BackendRequest::get("/api/donation/closing")).await
    }

    /// Returns `{donation, history}`.
    pub async fn donation(&self, donation_id: i64, page: CursorQuery) -> Result<Value, GatewayError> {
        let request = BackendRequest::get("/api/donation").query("donationId", donation_id);
        self.call(with_cursor(request, "cursor", page)).await
    }

    pub async fn make_donation(&self, donation: &MakeDonationRequest) -> Result<Value, GatewayError> {
        self.call(BackendRequest::post("/api/donations").json(to_json(donation)?))
            .await
    }

    pub async fn my_donations(&self, page: CursorQuery) -> Result<Value, GatewayError> {
        self.call(with_cursor(BackendRequest::get("/api/donations/mine"), "cursor", page))
            .await
    }

    pub async fn bone_balance(&self) -> Result<Value, GatewayError> {
        self.call(BackendRequest::get("/api/donations/bone")).await
    }

    /// Returns `{orderId, amount, orderName}`.
    pub async fn prepare_payment(
        &self,
        payment: &PreparePaymentRequest,
    ) -> Result<Value, GatewayError> {
        self.call(BackendRequest::post("/api/payment/prepare").json(to_json(payment)?))
            .await
    }

    pub async fn approve_payment(
        &self,
        payment: &ApprovePaymentRequest,
    ) -> Result<Value, GatewayError> {
        self.call(BackendRequest::post("/api/payment/approve").json(to_json(payment)?))
            .await
    }
}

// =============================================================================
// Chat
// =============================================================================

impl BearerClient {
    pub async fn create_chat_room(&self, room: &ChatRoomRequest) -> Result<Value, GatewayError> {
        self.call(BackendRequest::post("/api/chat/room/create").json(to_json(room)?))
            .await
    }

    pub async fn chat_rooms(&self) -> Result<Value, GatewayError> {
        self.call(BackendRequest::get("/api/chat/room/list")).await
    }

    pub async fn chat_room_card(&self, room_id: i64) -> Result<Value, GatewayError> {
        self.call(BackendRequest::get("/api/chat/room/card").query("roomId", room_id))
            .await
    }

    /// Returns `{room, messages}`.
    pub async fn enter_chat_room(&self, room_id: i64) -> Result<Value, GatewayError> {
        self.call(BackendRequest::post(format!("/api/chat/{}/enter", room_id)))
            .await
    }

    pub async fn chat_adoption(&self, room_id: i64) -> Result<Value, GatewayError> {
        self.call(BackendRequest::get(format!("/api/chat/room/{}/adoption", room_id)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::KeyValueStore;
    use crate::{gateway::bearer::tests::bearer_for, session::ACCESS_TOKEN_KEY};
    use mockito::Matcher;

    fn nose() -> ImageUpload {
        ImageUpload {
            file_name: "nose.jpg".into(),
            content_type: "image/jpeg".into(),
            bytes: Bytes::from_static(b"jpeg-bytes"),
        }
    }

    #[test]
    fn new_pet_fields_skip_absent_values() {
        let pet = NewPet {
            pet_name: "초코".into(),
            breed: "POODLE".into(),
            species: "dog".into(),
            old: Some(3),
            weight: None,
            gender: None,
            color: Some("brown".into()),
            feature: None,
            neutered: Some(true),
            nose_image: nose(),
        };
        let names: Vec<_> = pet
            .fields()
            .into_iter()
            .map(|field| match field {
                MultipartField::Text { name, .. }
                | MultipartField::Json { name, .. }
                | MultipartField::File { name, .. } => name,
            })
            .collect();
        assert_eq!(
            names,
            ["petName", "breed", "species", "old", "color", "neutered", "noseImage"]
        );
    }

    #[tokio::test]
    async fn adoption_list_sends_cursor_and_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/adoption")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("cursor".into(), "12".into()),
                Matcher::UrlEncoded("size".into(), "9".into()),
                Matcher::UrlEncoded("region".into(), "SEOUL".into()),
            ]))
            .match_header("authorization", "Bearer access")
            .with_status(200)
            .with_body(
                r#"{"data":[{"adoptId":1,"petId":2,"status":"AVAILABLE"}],"cursor":1,"hasNext":true}"#,
            )
            .create_async()
            .await;

        let (client, store) = bearer_for(&server);
        store.set(ACCESS_TOKEN_KEY, "access").unwrap();
        let page = client
            .adoptions(
                CursorQuery {
                    cursor: Some(12),
                    size: Some(9),
                },
                &AdoptionFilter {
                    region: Some("SEOUL".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.cursor, Some(1));
        assert!(page.has_next);
    }

    #[tokio::test]
    async fn review_creation_carries_adopt_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/story/review")
            .match_body(Matcher::PartialJson(json!({"title": "후기", "adoptId": 7})))
            .with_status(200)
            .with_body(r#"{"storyId":3}"#)
            .create_async()
            .await;

        let (client, _) = bearer_for(&server);
        let story = StoryRequest {
            title: "후기".into(),
            content: "잘 지내요".into(),
            pet_id: 1,
            member_name: "보호자".into(),
        };
        let created = client
            .create_story(StoryKind::Review, &story, Some(7))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(created, json!({"storyId": 3}));
    }

    #[tokio::test]
    async fn like_toggle_uses_query_parameter() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/like")
            .match_query(Matcher::UrlEncoded("storyId".into(), "5".into()))
            .with_status(200)
            .with_body(r#"{"isLiked":true,"likeCount":4}"#)
            .create_async()
            .await;

        let (client, _) = bearer_for(&server);
        let liked = client.toggle_like(5).await.unwrap();
        mock.assert_async().await;
        assert_eq!(liked["likeCount"], 4);
    }

    #[tokio::test]
    async fn transfer_verification_uploads_noseprint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/pet/did:pet:1/transfer/verify")
            .match_body(Matcher::Regex(r#"name="noseImage"; filename="nose.jpg""#.into()))
            .with_status(200)
            .with_body(r#"{"verified":true,"similarity":0.97}"#)
            .create_async()
            .await;

        let (client, _) = bearer_for(&server);
        let result = client
            .verify_transfer("did:pet:1", "t-1", &nose())
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(result["verified"], true);
    }
}
