// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! Stories, comments, likes and chat rooms.

use axum::extract::{multipart::MultipartError, Multipart, State};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use utoipa::ToSchema;

use super::{ActionForm, json_body, number, positive, text};
use crate::{
    api::proxy::{forward, ProxyPolicy},
    auth::ForwardedAuthorization,
    error::ApiError,
    gateway::{BackendRequest, MultipartField, StoryKind},
    models::{ActionMessage, ChatRoomRequest, CommentRequest, StoryRequest},
    state::AppState,
    validation::{
        ValidationError, COMMENT_TOO_LONG, EMPTY_COMMENT, EMPTY_ROOM_NAME, INVALID_MEMBER_ID,
        INVALID_STORY_ID, INVALID_TARGET, INVALID_TARGET_ID, MISSING_CHAT_FIELDS,
        MISSING_COMMENT_FIELDS, MISSING_LIKE_FIELDS, MISSING_STORY_FIELDS, ROOM_NAME_TOO_LONG,
    },
};

pub const STORY_ERROR: &str = "서버 요청 처리 중 오류가 발생했습니다.";
pub const COMMENT_ERROR: &str = "댓글 작성 중 오류가 발생했습니다.";
pub const LIKE_ERROR: &str = "좋아요 처리 중 오류가 발생했습니다.";
pub const CHAT_ERROR: &str = "채팅방 생성 중 오류가 발생했습니다.";

pub const INVALID_MULTIPART: ValidationError =
    ValidationError::bad_request("INVALID_FORM", "요청 형식이 올바르지 않습니다.");

const MAX_COMMENT_LEN: usize = 1000;
const MAX_ROOM_NAME_LEN: usize = 100;

/// Multipart story upload: text fields plus an optional `image` file.
#[derive(Debug, Default, ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct StoryForm {
    pub title: Option<String>,
    pub content: Option<String>,
    pub pet_id: Option<String>,
    pub member_name: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<MultipartField>,
}

impl StoryForm {
    async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = StoryForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" {
                let file_name = field.file_name().unwrap_or("image").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    form.image = Some(MultipartField::File {
                        name,
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                continue;
            }

            let value = Some(field.text().await?);
            match name.as_str() {
                "title" => form.title = value,
                "content" => form.content = value,
                "petId" => form.pet_id = value,
                "memberName" => form.member_name = value,
                _ => {}
            }
        }
        Ok(form)
    }

    fn into_fields(self) -> Result<Vec<MultipartField>, ApiError> {
        let (Some(title), Some(content), Some(pet_id), Some(member_name)) = (
            text(&self.title),
            text(&self.content),
            number(&self.pet_id),
            text(&self.member_name),
        ) else {
            return Err(MISSING_STORY_FIELDS.into());
        };

        let story = StoryRequest {
            title: title.to_string(),
            content: content.to_string(),
            pet_id,
            member_name: member_name.to_string(),
        };
        let mut fields = vec![MultipartField::Json {
            name: "story".into(),
            value: json_body(&story)?,
        }];
        fields.extend(self.image);
        Ok(fields)
    }
}

async fn create_story(
    state: AppState,
    auth: ForwardedAuthorization,
    multipart: Multipart,
    kind: StoryKind,
) -> Result<ActionMessage, ApiError> {
    let form = StoryForm::read(multipart).await.map_err(|e| {
        warn!(error = %e, "Unreadable story upload");
        ApiError::from(INVALID_MULTIPART)
    })?;
    let call = BackendRequest::post(kind.base())
        .headers(auth.headers())
        .multipart(form.into_fields()?);
    forward(&state.gateway, call, ProxyPolicy::action(STORY_ERROR)).await
}

#[utoipa::path(
    post,
    path = "/actions/story/daily",
    tag = "Stories",
    request_body(content = StoryForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid input", body = ActionMessage)
    )
)]
pub async fn create_daily_story(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    multipart: Multipart,
) -> Result<ActionMessage, ApiError> {
    create_story(state, auth, multipart, StoryKind::Daily).await
}

#[utoipa::path(
    post,
    path = "/actions/story/review",
    tag = "Stories",
    request_body(content = StoryForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid input", body = ActionMessage)
    )
)]
pub async fn create_review_story(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    multipart: Multipart,
) -> Result<ActionMessage, ApiError> {
    create_story(state, auth, multipart, StoryKind::Review).await
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentForm {
    pub story_id: Option<String>,
    pub comment: Option<String>,
    pub member_id: Option<String>,
}

impl CommentForm {
    fn validate(&self) -> Result<CommentRequest, ValidationError> {
        let (Some(story_id), Some(comment), Some(member_id)) = (
            number(&self.story_id),
            text(&self.comment),
            number(&self.member_id),
        ) else {
            return Err(MISSING_COMMENT_FIELDS);
        };

        let story_id = positive(story_id, INVALID_STORY_ID)?;
        let member_id = positive(member_id, INVALID_MEMBER_ID)?;
        if comment.trim().is_empty() {
            return Err(EMPTY_COMMENT);
        }
        if comment.chars().count() > MAX_COMMENT_LEN {
            return Err(COMMENT_TOO_LONG);
        }

        Ok(CommentRequest {
            story_id,
            comment: comment.trim().to_string(),
            member_id,
        })
    }
}

#[utoipa::path(
    post,
    path = "/actions/comment",
    tag = "Stories",
    request_body(content = CommentForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid input", body = ActionMessage)
    )
)]
pub async fn create_comment(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    ActionForm(form): ActionForm<CommentForm>,
) -> Result<ActionMessage, ApiError> {
    let request = form.validate()?;
    let call = BackendRequest::post("/api/comment/")
        .headers(auth.headers())
        .json(json_body(&request)?);
    forward(&state.gateway, call, ProxyPolicy::action(COMMENT_ERROR)).await
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeForm {
    pub story_id: Option<String>,
    pub member_id: Option<String>,
}

/// Toggle the caller's like on a story.
#[utoipa::path(
    post,
    path = "/actions/like",
    tag = "Stories",
    request_body(content = LikeForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid input", body = ActionMessage)
    )
)]
pub async fn toggle_like(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    ActionForm(form): ActionForm<LikeForm>,
) -> Result<ActionMessage, ApiError> {
    let (Some(story_id), Some(member_id)) = (number(&form.story_id), number(&form.member_id))
    else {
        return Err(MISSING_LIKE_FIELDS.into());
    };
    let story_id = positive(story_id, INVALID_STORY_ID)?;
    let member_id = positive(member_id, INVALID_MEMBER_ID)?;

    let call = BackendRequest::post("/api/like/")
        .query("storyId", story_id)
        .headers(auth.headers())
        .json(json!({ "memberId": member_id }));
    forward(&state.gateway, call, ProxyPolicy::action(LIKE_ERROR)).await
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoomForm {
    pub target_id: Option<String>,
    pub room_name: Option<String>,
    pub member_id: Option<String>,
}

impl ChatRoomForm {
    fn validate(&self) -> Result<ChatRoomRequest, ValidationError> {
        let (Some(target_id), Some(room_name), Some(member_id)) = (
            number(&self.target_id),
            text(&self.room_name),
            number(&self.member_id),
        ) else {
            return Err(MISSING_CHAT_FIELDS);
        };

        let target_id = positive(target_id, INVALID_TARGET_ID)?;
        let member_id = positive(member_id, INVALID_MEMBER_ID)?;
        if room_name.trim().is_empty() {
            return Err(EMPTY_ROOM_NAME);
        }
        if room_name.chars().count() > MAX_ROOM_NAME_LEN {
            return Err(ROOM_NAME_TOO_LONG);
        }
        if target_id == member_id {
            return Err(INVALID_TARGET);
        }

        Ok(ChatRoomRequest {
            target_id,
            room_name: room_name.trim().to_string(),
            member_id,
        })
    }
}

#[utoipa::path(
    post,
    path = "/actions/chat/room",
    tag = "Chat",
    request_body(content = ChatRoomForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid input", body = ActionMessage)
    )
)]
pub async fn create_chat_room(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    ActionForm(form): ActionForm<ChatRoomForm>,
) -> Result<ActionMessage, ApiError> {
    let request = form.validate()?;
    let call = BackendRequest::post("/api/chat/room/create")
        .headers(auth.headers())
        .json(json_body(&request)?);
    forward(&state.gateway, call, ProxyPolicy::action(CHAT_ERROR)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{app_for, post_form, send};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use mockito::Matcher;

    const BOUNDARY: &str = "dogcatpaw-boundary";

    fn story_upload(path: &str, parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, file_name, value) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: image/png\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::post(path)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn daily_story_is_sent_as_multipart() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/story/daily")
            .match_header("content-type", Matcher::Regex("^multipart/form-data".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="story""#.into()),
                Matcher::Regex(r#""memberName":"choco-mom""#.into()),
                Matcher::Regex(r#"filename="walk.png""#.into()),
            ]))
            .with_status(200)
            .with_body(r#"{"isSuccess":true,"status":"200","code":"STORY200","message":"ok","result":{"storyId":4}}"#)
            .create_async()
            .await;

        let request = story_upload(
            "/actions/story/daily",
            &[
                ("title", None, "산책"),
                ("content", None, "오늘은 공원에 갔어요"),
                ("petId", None, "3"),
                ("memberName", None, "choco-mom"),
                ("image", Some("walk.png"), "png-bytes"),
            ],
        );
        let (status, reply) = send(app_for(&server), request).await;

        mock.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["result"]["storyId"], 4);
    }

    #[tokio::test]
    async fn review_story_without_image_or_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/story/review")
            .match_body(Matcher::Regex(r#"name="story""#.into()))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let app = app_for(&server);

        let request = story_upload(
            "/actions/story/review",
            &[("title", None, "입양 후기"), ("content", None, "잘 지내요")],
        );
        let (status, reply) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply["code"], "MISSING_REQUIRED_FIELDS");

        let request = story_upload(
            "/actions/story/review",
            &[
                ("title", None, "입양 후기"),
                ("content", None, "잘 지내요"),
                ("petId", None, "3"),
                ("memberName", None, "m"),
                ("image", Some("empty.png"), ""),
            ],
        );
        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn comment_rules_and_forwarding() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/comment/")
            .match_body(Matcher::Json(json!({"storyId": 1, "comment": "귀여워요", "memberId": 2})))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let app = app_for(&server);

        let (_, reply) = post_form(app.clone(), "/actions/comment", "storyId=1&memberId=2", &[]).await;
        assert_eq!(reply["code"], "MISSING_REQUIRED_FIELDS");

        let (_, reply) =
            post_form(app.clone(), "/actions/comment", "storyId=1&memberId=2&comment=++", &[]).await;
        assert_eq!(reply["code"], "EMPTY_COMMENT");

        let long = "a".repeat(1001);
        let (_, reply) = post_form(
            app.clone(),
            "/actions/comment",
            &format!("storyId=1&memberId=2&comment={long}"),
            &[],
        )
        .await;
        assert_eq!(reply["code"], "COMMENT_TOO_LONG");

        let (status, _) = post_form(
            app,
            "/actions/comment",
            "storyId=1&memberId=2&comment=+%EA%B7%80%EC%97%AC%EC%9B%8C%EC%9A%94+",
            &[],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn like_sends_story_in_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/like/")
            .match_query(Matcher::UrlEncoded("storyId".into(), "8".into()))
            .match_body(Matcher::Json(json!({"memberId": 2})))
            .with_status(200)
            .with_body(r#"{"liked":true}"#)
            .create_async()
            .await;
        let app = app_for(&server);

        let (_, reply) = post_form(app.clone(), "/actions/like", "storyId=8", &[]).await;
        assert_eq!(reply["message"], "storyId와 memberId는 필수 항목입니다.");

        let (_, reply) = post_form(app.clone(), "/actions/like", "storyId=-8&memberId=2", &[]).await;
        assert_eq!(reply["code"], "INVALID_STORY_ID");

        let (_, reply) = post_form(app, "/actions/like", "storyId=8&memberId=2", &[]).await;
        assert_eq!(reply["result"]["liked"], true);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn chat_room_rules() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat/room/create")
            .with_status(503)
            .create_async()
            .await;
        let app = app_for(&server);

        let (_, reply) =
            post_form(app.clone(), "/actions/chat/room", "targetId=3&memberId=3&roomName=hi", &[]).await;
        assert_eq!(reply["code"], "INVALID_TARGET");

        let (_, reply) =
            post_form(app.clone(), "/actions/chat/room", "targetId=-1&memberId=3&roomName=hi", &[]).await;
        assert_eq!(reply["code"], "INVALID_TARGET_ID");

        let (_, reply) =
            post_form(app.clone(), "/actions/chat/room", "targetId=1&memberId=3&roomName=+", &[]).await;
        assert_eq!(reply["code"], "EMPTY_ROOM_NAME");

        let (status, reply) =
            post_form(app, "/actions/chat/room", "targetId=1&memberId=3&roomName=hi", &[]).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(reply["message"], CHAT_ERROR);
    }
}
