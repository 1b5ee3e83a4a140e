// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

//! # Route Handlers
//!
//! `GET /api/...` read endpoints. Query and path parameters are validated
//! locally, then the call is relayed to the same path on the backend.
//! Public routes pass the caller's `authorization` through when present so
//! the backend can personalise the reply; session routes require it.
//!
//! Uncaught failures are reported as `INTERNAL_SERVER_ERROR`.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    api::proxy::{forward, ProxyPolicy},
    auth::{BearerAuth, ForwardedAuthorization},
    error::ApiError,
    gateway::BackendRequest,
    models::ActionMessage,
    state::AppState,
    validation::{
        length_between, parse_cursor, parse_int, parse_page_size, parse_required_id,
        INVALID_CURSOR, INVALID_CURSOR_ID, INVALID_DAILY_STORY_ID, INVALID_DONATION_ID_PARAM,
        INVALID_REVIEW_ID, INVALID_ROOM_ID, INVALID_STORY_ID_PARAM, KEYWORD_TOO_LONG,
        EMPTY_KEYWORD, MISSING_DONATION_ID, MISSING_KEYWORD, MISSING_ROOM_ID, MISSING_STORY_ID,
    },
};

const DONATION_NOT_FOUND: (&str, &str) = ("DONATION_NOT_FOUND", "존재하지 않는 후원 공고입니다.");
const STORY_NOT_FOUND: (&str, &str) = ("STORY_NOT_FOUND", "존재하지 않는 스토리입니다.");
const ROOM_NOT_FOUND: (&str, &str) = ("ROOM_NOT_FOUND", "존재하지 않는 채팅방입니다.");

const DETAIL_PAGE_SIZE: u32 = 5;
const LIST_PAGE_SIZE: u32 = 9;
const MAX_KEYWORD_LEN: usize = 100;

fn route(fallback: &'static str, not_found: Option<(&'static str, &'static str)>) -> ProxyPolicy {
    let policy = ProxyPolicy::route(fallback);
    match not_found {
        Some((code, message)) => policy.not_found(code, message),
        None => policy,
    }
}

// =============================================================================
// Query parameters
// =============================================================================

/// `donationId` plus a cursor page of donation history.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase", parameter_in = Query)]
pub struct DonationQuery {
    pub donation_id: Option<String>,
    /// 1 to 50, default 5.
    pub size: Option<String>,
    pub cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase", parameter_in = Query)]
pub struct CursorListQuery {
    pub cursor_id: Option<String>,
    /// 1 to 50, default 9.
    pub size: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase", parameter_in = Query)]
pub struct CommentQuery {
    pub story_id: Option<String>,
    /// 1 to 50, default 5.
    pub size: Option<String>,
    pub cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase", parameter_in = Query)]
pub struct StoryDetailQuery {
    /// Viewer, for the `liked` flag.
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase", parameter_in = Query)]
pub struct ReviewSearchQuery {
    pub keyword: Option<String>,
    pub cursor_id: Option<String>,
    /// 1 to 50, default 9.
    pub size: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase", parameter_in = Query)]
pub struct RoomQuery {
    pub room_id: Option<String>,
}

// =============================================================================
// Donations
// =============================================================================

/// Donation post detail with a page of its donation history.
#[utoipa::path(
    get,
    path = "/api/donation",
    tag = "Donations",
    params(DonationQuery),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid parameters", body = ActionMessage),
        (status = 404, description = "Unknown donation post", body = ActionMessage)
    )
)]
pub async fn donation_detail(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    Query(query): Query<DonationQuery>,
) -> Result<ActionMessage, ApiError> {
    donation_page(
        &state,
        auth,
        query,
        "/api/donation/",
        "후원 공고 조회 중 오류가 발생했습니다.",
    )
    .await
}

/// Donor list of one donation post.
#[utoipa::path(
    get,
    path = "/api/donation-list/lists",
    tag = "Donations",
    params(DonationQuery),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid parameters", body = ActionMessage),
        (status = 404, description = "Unknown donation post", body = ActionMessage)
    )
)]
pub async fn donation_history(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    Query(query): Query<DonationQuery>,
) -> Result<ActionMessage, ApiError> {
    donation_page(
        &state,
        auth,
        query,
        "/api/donation-list/lists",
        "후원 목록 조회 중 오류가 발생했습니다.",
    )
    .await
}

async fn donation_page(
    state: &AppState,
    auth: ForwardedAuthorization,
    query: DonationQuery,
    path: &str,
    fallback: &'static str,
) -> Result<ActionMessage, ApiError> {
    let donation_id = parse_required_id(
        query.donation_id.as_deref(),
        MISSING_DONATION_ID,
        INVALID_DONATION_ID_PARAM,
    )?;
    let size = parse_page_size(query.size.as_deref(), DETAIL_PAGE_SIZE)?;
    let cursor = parse_cursor(query.cursor.as_deref(), INVALID_CURSOR)?;

    let call = BackendRequest::get(path)
        .headers(auth.headers())
        .query("donationId", donation_id)
        .query("size", size)
        .query_opt("cursor", cursor);
    forward(&state.gateway, call, route(fallback, Some(DONATION_NOT_FOUND))).await
}

#[utoipa::path(
    get,
    path = "/api/donation/list",
    tag = "Donations",
    params(CursorListQuery),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid parameters", body = ActionMessage)
    )
)]
pub async fn donation_list(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    Query(query): Query<CursorListQuery>,
) -> Result<ActionMessage, ApiError> {
    let size = parse_page_size(query.size.as_deref(), LIST_PAGE_SIZE)?;
    let cursor_id = parse_cursor(query.cursor_id.as_deref(), INVALID_CURSOR_ID)?;

    let call = BackendRequest::get("/api/donation/list")
        .headers(auth.headers())
        .query("size", size)
        .query_opt("cursorId", cursor_id);
    forward(
        &state.gateway,
        call,
        route("후원 목록 조회 중 오류가 발생했습니다.", None),
    )
    .await
}

/// Donation posts closest to their deadline.
#[utoipa::path(
    get,
    path = "/api/donation/closing",
    tag = "Donations",
    responses((status = 200, description = "Backend envelope", body = ActionMessage))
)]
pub async fn donation_closing(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
) -> Result<ActionMessage, ApiError> {
    let call = BackendRequest::get("/api/donation/closing").headers(auth.headers());
    forward(
        &state.gateway,
        call,
        route("마감 임박 후원 조회 중 오류가 발생했습니다.", None),
    )
    .await
}

// =============================================================================
// Stories
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/comment",
    tag = "Stories",
    params(CommentQuery),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid parameters", body = ActionMessage),
        (status = 404, description = "Unknown story", body = ActionMessage)
    )
)]
pub async fn comments(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    Query(query): Query<CommentQuery>,
) -> Result<ActionMessage, ApiError> {
    let story_id = parse_required_id(
        query.story_id.as_deref(),
        MISSING_STORY_ID,
        INVALID_STORY_ID_PARAM,
    )?;
    let size = parse_page_size(query.size.as_deref(), DETAIL_PAGE_SIZE)?;
    let cursor = parse_cursor(query.cursor.as_deref(), INVALID_CURSOR)?;

    let call = BackendRequest::get("/api/comment")
        .headers(auth.headers())
        .query("storyId", story_id)
        .query("size", size)
        .query_opt("cursor", cursor);
    forward(
        &state.gateway,
        call,
        route("댓글 조회 중 오류가 발생했습니다.", Some(STORY_NOT_FOUND)),
    )
    .await
}

#[utoipa::path(
    get,
    path = "/api/story/daily/{id}",
    tag = "Stories",
    params(("id" = String, Path, description = "Daily story id"), StoryDetailQuery),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid id", body = ActionMessage)
    )
)]
pub async fn daily_story(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    Path(id): Path<String>,
    Query(query): Query<StoryDetailQuery>,
) -> Result<ActionMessage, ApiError> {
    let id = parse_required_id(Some(id.as_str()), INVALID_DAILY_STORY_ID, INVALID_DAILY_STORY_ID)?;
    story_detail(
        &state,
        auth,
        format!("/api/story/daily/{id}"),
        query,
        "일지 조회 중 오류가 발생했습니다.",
    )
    .await
}

#[utoipa::path(
    get,
    path = "/api/story/review/{id}",
    tag = "Stories",
    params(("id" = String, Path, description = "Review id"), StoryDetailQuery),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid id", body = ActionMessage)
    )
)]
pub async fn review_story(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    Path(id): Path<String>,
    Query(query): Query<StoryDetailQuery>,
) -> Result<ActionMessage, ApiError> {
    let id = parse_required_id(Some(id.as_str()), INVALID_REVIEW_ID, INVALID_REVIEW_ID)?;
    story_detail(
        &state,
        auth,
        format!("/api/story/review/{id}"),
        query,
        "후기 조회 중 오류가 발생했습니다.",
    )
    .await
}

async fn story_detail(
    state: &AppState,
    auth: ForwardedAuthorization,
    path: String,
    query: StoryDetailQuery,
    fallback: &'static str,
) -> Result<ActionMessage, ApiError> {
    // A malformed viewer id is dropped rather than rejected.
    let user_id = parse_int(query.user_id.as_deref()).filter(|id| *id > 0);
    let call = BackendRequest::get(path)
        .headers(auth.headers())
        .query_opt("userId", user_id);
    forward(&state.gateway, call, route(fallback, None)).await
}

#[utoipa::path(
    get,
    path = "/api/story/review/search",
    tag = "Stories",
    params(ReviewSearchQuery),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid parameters", body = ActionMessage)
    )
)]
pub async fn search_reviews(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
    Query(query): Query<ReviewSearchQuery>,
) -> Result<ActionMessage, ApiError> {
    let keyword = query.keyword.as_deref().ok_or(MISSING_KEYWORD)?;
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(EMPTY_KEYWORD.into());
    }
    if !length_between(keyword, 1, MAX_KEYWORD_LEN) {
        return Err(KEYWORD_TOO_LONG.into());
    }
    let size = parse_page_size(query.size.as_deref(), LIST_PAGE_SIZE)?;
    let cursor_id = parse_cursor(query.cursor_id.as_deref(), INVALID_CURSOR)?;

    let call = BackendRequest::get("/api/story/review/search")
        .headers(auth.headers())
        .query("keyword", keyword)
        .query("size", size)
        .query_opt("cursorId", cursor_id);
    forward(
        &state.gateway,
        call,
        route("후기 검색 중 오류가 발생했습니다.", None),
    )
    .await
}

// =============================================================================
// Adoption
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/adoption/home",
    tag = "Adoption",
    responses((status = 200, description = "Backend envelope", body = ActionMessage))
)]
pub async fn adoption_home(
    State(state): State<AppState>,
    auth: ForwardedAuthorization,
) -> Result<ActionMessage, ApiError> {
    let call = BackendRequest::get("/api/adoption/home").headers(auth.headers());
    forward(
        &state.gateway,
        call,
        route("홈 화면 데이터 조회 중 오류가 발생했습니다.", None),
    )
    .await
}

// =============================================================================
// Session routes
// =============================================================================

/// The caller's pets.
#[utoipa::path(
    get,
    path = "/api/pet",
    tag = "Pets",
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 401, description = "Missing or expired session", body = ActionMessage),
        (status = 403, description = "Not allowed", body = ActionMessage)
    )
)]
pub async fn my_pets(
    State(state): State<AppState>,
    auth: BearerAuth,
) -> Result<ActionMessage, ApiError> {
    let call = BackendRequest::get("/api/pet").headers(auth.headers());
    forward(
        &state.gateway,
        call,
        route("반려동물 목록 조회 중 오류가 발생했습니다.", None).session(),
    )
    .await
}

#[utoipa::path(
    get,
    path = "/api/chat/room/list",
    tag = "Chat",
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 401, description = "Missing or expired session", body = ActionMessage),
        (status = 403, description = "Not allowed", body = ActionMessage)
    )
)]
pub async fn chat_rooms(
    State(state): State<AppState>,
    auth: BearerAuth,
) -> Result<ActionMessage, ApiError> {
    let call = BackendRequest::get("/api/chat/room/list").headers(auth.headers());
    forward(
        &state.gateway,
        call,
        route("채팅방 목록 조회 중 오류가 발생했습니다.", None).session(),
    )
    .await
}

/// Room summary card. The room id is checked before the session.
#[utoipa::path(
    get,
    path = "/api/chat/room/card",
    tag = "Chat",
    params(RoomQuery),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid room id", body = ActionMessage),
        (status = 401, description = "Missing or expired session", body = ActionMessage),
        (status = 404, description = "Unknown room", body = ActionMessage)
    )
)]
pub async fn chat_room_card(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RoomQuery>,
) -> Result<ActionMessage, ApiError> {
    let room_id = parse_required_id(query.room_id.as_deref(), MISSING_ROOM_ID, INVALID_ROOM_ID)?;
    let auth = BearerAuth::from_headers(&headers)?;

    let call = BackendRequest::get("/api/chat/room/card")
        .headers(auth.headers())
        .query("roomId", room_id);
    forward(
        &state.gateway,
        call,
        route("채팅방 정보 조회 중 오류가 발생했습니다.", Some(ROOM_NOT_FOUND)).session(),
    )
    .await
}

#[utoipa::path(
    get,
    path = "/api/chat/history/{roomId}",
    tag = "Chat",
    params(("roomId" = String, Path, description = "Chat room id")),
    responses(
        (status = 200, description = "Backend envelope", body = ActionMessage),
        (status = 400, description = "Invalid room id", body = ActionMessage),
        (status = 401, description = "Missing or expired session", body = ActionMessage),
        (status = 404, description = "Unknown room", body = ActionMessage)
    )
)]
pub async fn chat_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
) -> Result<ActionMessage, ApiError> {
    let room_id = parse_required_id(Some(room_id.as_str()), INVALID_ROOM_ID, INVALID_ROOM_ID)?;
    let auth = BearerAuth::from_headers(&headers)?;

    let call = BackendRequest::get(format!("/api/chat/history/{room_id}")).headers(auth.headers());
    forward(
        &state.gateway,
        call,
        route("채팅 기록 조회 중 오류가 발생했습니다.", Some(ROOM_NOT_FOUND)).session(),
    )
    .await
}
