//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use market_engine::{
    db_types::{ConversationKey, NewListing, UserId},
    fanout::MATCH_VIEW_SIZE,
    traits::{ConversationManagement, ListingManagement, MatchManagement, NotificationManagement},
    ConversationApi,
    MatchFlowApi,
    NotificationApi,
};

use crate::{
    config::ServerOptions,
    data_objects::{
        JsonResponse,
        LimitParams,
        ListingCreatedResponse,
        NewListingRequest,
        NotificationsResponse,
        OpenConversationRequest,
        PostMessageRequest,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro.
// Every handler is generic over a single backend type `B`, which must satisfy all the listed bounds.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> B>)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Listings  ----------------------------------------------------
route!(listing_created => Post "/webhook/listing_created" impl ListingManagement, MatchManagement);
/// Route handler for the listing-created webhook
///
/// The posting flow calls this endpoint after a user publishes a listing. The listing is stored and, if auto-scan is
/// enabled, scanned against the opposite-kind listings straight away.
///
/// The listing is accepted even if the scan fails. The failure is logged and the `scan` field of the response is
/// left empty; the next scan for the owner will pick the listing up.
pub async fn listing_created<B>(
    body: web::Json<NewListingRequest>,
    api: web::Data<MatchFlowApi<B>>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError>
where
    B: ListingManagement + MatchManagement,
{
    let listing = NewListing::try_from(body.into_inner()).map_err(ServerError::InvalidRequestBody)?;
    debug!("💻️ Received new {} listing from {}: {}", listing.kind, listing.owner_id, listing.title);
    let listing = api.ingest_listing(listing).await?;
    let scan = if options.auto_scan {
        match api.scan_for_listing(listing.id).await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("💻️ Listing #{} was stored, but scanning it for matches failed. {e}", listing.id);
                None
            },
        }
    } else {
        None
    };
    Ok(HttpResponse::Ok().json(ListingCreatedResponse { listing, scan }))
}

//----------------------------------------------   Matches  ----------------------------------------------------
route!(scan_for_user => Post "/scan/{user_id}" impl ListingManagement, MatchManagement);
/// Route handler for the on-demand scan endpoint
///
/// Scans the user's most recent listings and records every new match. Re-running a scan is safe; pairs that were
/// already matched are counted in `already_existing`.
pub async fn scan_for_user<B>(
    path: web::Path<String>,
    api: web::Data<MatchFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: ListingManagement + MatchManagement,
{
    let user = UserId::from(path.into_inner());
    debug!("💻️ POST scan for {user}");
    let report = api.scan_for_user(&user).await?;
    Ok(HttpResponse::Ok().json(report))
}

route!(matches_for_user => Get "/matches/{user_id}" impl ListingManagement, MatchManagement);
pub async fn matches_for_user<B>(
    path: web::Path<String>,
    query: web::Query<LimitParams>,
    api: web::Data<MatchFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: ListingManagement + MatchManagement,
{
    let user = UserId::from(path.into_inner());
    let limit = query.limit.unwrap_or(MATCH_VIEW_SIZE).min(MATCH_VIEW_SIZE);
    debug!("💻️ GET matches for {user}");
    let matches = api.fetch_matches_for_user(&user, limit).await?;
    Ok(HttpResponse::Ok().json(matches))
}

route!(preview_for_user => Get "/preview/{user_id}" impl ListingManagement, MatchManagement);
/// Route handler for the match preview endpoint
///
/// Ranks every listing the user owns against all current listings, without recording anything.
pub async fn preview_for_user<B>(
    path: web::Path<String>,
    api: web::Data<MatchFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: ListingManagement + MatchManagement,
{
    let user = UserId::from(path.into_inner());
    debug!("💻️ GET preview for {user}");
    let preview = api.preview_for_viewer(&user).await?;
    Ok(HttpResponse::Ok().json(preview))
}

//----------------------------------------------   Conversations  ----------------------------------------------------
route!(open_conversation => Post "/conversations" impl ConversationManagement, MatchManagement);
/// Route handler for opening a conversation
///
/// The body either names a match (`{"match_id": 12}`), in which case the conversation is about the match's selling
/// listing, or gives the conversation key explicitly (`{"post_id": 3, "buyer_id": "..", "seller_id": ".."}`).
/// Opening the same conversation twice returns the same record.
pub async fn open_conversation<B>(
    body: web::Json<OpenConversationRequest>,
    api: web::Data<ConversationApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: ConversationManagement + MatchManagement,
{
    let conversation = match body.into_inner() {
        OpenConversationRequest::ForMatch { match_id } => {
            debug!("💻️ POST open conversation for match #{match_id}");
            api.open_for_match(match_id).await?
        },
        OpenConversationRequest::ForKey { post_id, buyer_id, seller_id } => {
            debug!("💻️ POST open conversation about #{post_id} between {buyer_id} and {seller_id}");
            api.open_conversation(&ConversationKey::new(post_id, buyer_id, seller_id)).await?
        },
    };
    Ok(HttpResponse::Ok().json(conversation))
}

route!(conversations_for_user => Get "/conversations/{user_id}" impl ConversationManagement, MatchManagement);
pub async fn conversations_for_user<B>(
    path: web::Path<String>,
    api: web::Data<ConversationApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: ConversationManagement + MatchManagement,
{
    let user = UserId::from(path.into_inner());
    debug!("💻️ GET conversations for {user}");
    let conversations = api.conversations_for_user(&user).await?;
    Ok(HttpResponse::Ok().json(conversations))
}

route!(post_message => Post "/conversations/{id}/messages" impl ConversationManagement, MatchManagement);
pub async fn post_message<B>(
    path: web::Path<i64>,
    body: web::Json<PostMessageRequest>,
    api: web::Data<ConversationApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: ConversationManagement + MatchManagement,
{
    let conversation_id = path.into_inner();
    let PostMessageRequest { sender_id, body } = body.into_inner();
    let sender = UserId::from(sender_id);
    debug!("💻️ POST message from {sender} in conversation #{conversation_id}");
    let message = api.post_message(conversation_id, &sender, &body).await?;
    Ok(HttpResponse::Ok().json(message))
}

route!(conversation_messages => Get "/conversations/{id}/messages" impl ConversationManagement, MatchManagement);
pub async fn conversation_messages<B>(
    path: web::Path<i64>,
    api: web::Data<ConversationApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: ConversationManagement + MatchManagement,
{
    let conversation_id = path.into_inner();
    trace!("💻️ GET messages for conversation #{conversation_id}");
    let messages = api.messages(conversation_id).await?;
    Ok(HttpResponse::Ok().json(messages))
}

//----------------------------------------------   Notifications  ----------------------------------------------------
route!(notifications => Get "/notifications/{user_id}" impl NotificationManagement);
/// Route handler for the notifications endpoint
///
/// Returns the user's most recent notifications, newest first, together with the number that are still unread.
pub async fn notifications<B>(
    path: web::Path<String>,
    api: web::Data<NotificationApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: NotificationManagement,
{
    let user = UserId::from(path.into_inner());
    debug!("💻️ GET notifications for {user}");
    let notifications = api.notifications(&user).await?;
    let unread = api.unread_count(&user).await?;
    Ok(HttpResponse::Ok().json(NotificationsResponse { unread, notifications }))
}

route!(mark_notification_read => Post "/notifications/{user_id}/{id}/read" impl NotificationManagement);
pub async fn mark_notification_read<B>(
    path: web::Path<(String, i64)>,
    api: web::Data<NotificationApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: NotificationManagement,
{
    let (user, id) = path.into_inner();
    let user = UserId::from(user);
    debug!("💻️ POST mark notification #{id} read for {user}");
    if api.mark_read(id, &user).await? {
        Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Notification {id} marked as read"))))
    } else {
        Err(ServerError::NoRecordFound(format!("Notification {id} for {user}")))
    }
}
