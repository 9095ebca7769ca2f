//! API Integration Tests
//!
//! Each test boots its own server over in-memory stores and a fake payment
//! gateway; no external services are needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_error, assert_json, assert_status, fixtures::*, Browser, TestServer,
};
use reqwest::header::SET_COOKIE;
use reqwest::StatusCode;
use serde_json::{json, Value};

const LAPTOP: &str = "Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0";
const PHONE: &str = "Mozilla/5.0 (iPhone) Safari/605.1";

async fn signup_and_login(browser: &mut Browser<'_>, signup: &SignupBody) -> AuthBody {
    let response = browser.post("/signup", signup).await.unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let response = browser.post("/login", &signup.login()).await.unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

/// Create an order and complete it with a valid gateway signature
async fn pay(browser: &mut Browser<'_>, username: &str, payment_id: &str) -> AuthBody {
    let response = browser
        .post("/payment/create-order", &username_body(username))
        .await
        .unwrap();
    let order: OrderBody = assert_json(response, StatusCode::OK).await.unwrap();

    let signature = TestServer::sign_payment(&order.order_id, payment_id).unwrap();
    let response = browser
        .post(
            "/payment/verify-payment",
            &json!({
                "username": username,
                "razorpay_order_id": order.order_id,
                "razorpay_payment_id": payment_id,
                "razorpay_signature": signature,
            }),
        )
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_probes() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut browser = server.browser(LAPTOP);

    let response = browser.get("/health").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = browser.get("/health/ready").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["checks"]["store"], "healthy");
}

// ============================================================================
// Signup / login / logout
// ============================================================================

#[tokio::test]
async fn test_signup_then_login() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut browser = server.browser(LAPTOP);
    let alice = SignupBody {
        username: "alice".to_string(),
        email: "alice@x.com".to_string(),
        password: "pw1".to_string(),
    };

    let auth = signup_and_login(&mut browser, &alice).await;
    assert_eq!(auth.account.username, "alice");
    assert_eq!(auth.account.role, "user");
    assert_eq!(auth.account.subscription_status, "free");
    assert_eq!(auth.token_kind, "free");
    assert!(auth.expires_in > 0);
    assert!(browser.cookie("token").is_some());
    assert!(browser.cookie("sessionToken").is_some());

    let response = browser.get("/me").await.unwrap();
    let me: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me["authenticated"], true);
    assert_eq!(me["username"], "alice");
    assert_eq!(me["premium"], false);
    assert_eq!(me["session_valid"], true);
}

#[tokio::test]
async fn test_wrong_password_is_generic_and_sets_no_cookie() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut setup = server.browser(LAPTOP);
    let alice = SignupBody::new("alice", "pw1");
    let response = setup.post("/signup", &alice).await.unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let mut browser = server.browser(LAPTOP);
    let response = browser
        .post("/login", &json!({ "username": "alice", "password": "wrong" }))
        .await
        .unwrap();
    assert!(response.headers().get("set-cookie").is_none());
    let wrong_password = assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
        .await
        .unwrap();

    let response = browser
        .post("/login", &json!({ "username": "nobody", "password": "pw1" }))
        .await
        .unwrap();
    let unknown_user = assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
        .await
        .unwrap();

    assert_eq!(
        wrong_password["error"]["message"],
        unknown_user["error"]["message"]
    );
    assert!(browser.cookie("token").is_none());
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut browser = server.browser(LAPTOP);
    let signup = SignupBody::unique();

    let response = browser.post("/signup", &signup).await.unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let response = browser.post("/signup", &signup).await.unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();

    let response = browser
        .post(
            "/signup",
            &json!({ "username": "no spaces", "email": "a@x.com", "password": "pw" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_logout_clears_session_and_cookies() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut browser = server.browser(LAPTOP);
    signup_and_login(&mut browser, &SignupBody::unique()).await;

    let token = browser.cookie("token").unwrap().to_string();
    let session = browser.cookie("sessionToken").unwrap().to_string();

    let response = browser.get("/logout").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
    assert!(browser.cookie("token").is_none());
    assert!(browser.cookie("sessionToken").is_none());

    // Replaying the old cookies: the token still verifies, the session is gone
    browser.set_cookie("token", &token);
    browser.set_cookie("sessionToken", &session);
    let response = browser.get("/me").await.unwrap();
    let me: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me["authenticated"], true);
    assert_eq!(me["session_valid"], false);
}

// ============================================================================
// Entitlement and payments
// ============================================================================

#[tokio::test]
async fn test_premium_content_requires_login_then_payment() {
    let server = TestServer::start().await.expect("Failed to start server");
    let catalogue = seed_catalogue(&server.content);
    let premium_path = format!("/topics/{}", catalogue.premium_topic);

    let mut browser = server.browser(LAPTOP);
    let response = browser.get("/topics").await.unwrap();
    let topics: Vec<Value> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(topics.len(), 2);

    let response = browser.get(&premium_path).await.unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED, "LOGIN_REQUIRED")
        .await
        .unwrap();

    let signup = SignupBody::unique();
    signup_and_login(&mut browser, &signup).await;

    let response = browser.get(&premium_path).await.unwrap();
    assert_error(response, StatusCode::FORBIDDEN, "UPGRADE_REQUIRED")
        .await
        .unwrap();

    let auth = pay(&mut browser, &signup.username, "pay_1").await;
    assert_eq!(auth.token_kind, "paid");
    assert_eq!(auth.account.subscription_status, "premium");
    assert!(auth.account.device_locked);

    let response = browser.get(&premium_path).await.unwrap();
    let topic: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(topic["chapters"].as_array().unwrap().len(), 1);

    let response = browser
        .get(&format!("/payment/check-premium/{}", signup.username))
        .await
        .unwrap();
    let status: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(status["is_premium"], true);
    let days = status["days_remaining"].as_i64().unwrap();
    assert!((28..=31).contains(&days));
}

#[tokio::test]
async fn test_premium_items_are_withheld_from_free_readers() {
    let server = TestServer::start().await.expect("Failed to start server");
    let catalogue = seed_catalogue(&server.content);
    let path = format!("/chapters/{}", catalogue.free_chapter);

    let mut browser = server.browser(LAPTOP);
    let response = browser.get(&path).await.unwrap();
    let chapter: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(chapter["flashcards"].as_array().unwrap().len(), 1);
    assert_eq!(chapter["locked_items"], 1);

    let signup = SignupBody::unique();
    signup_and_login(&mut browser, &signup).await;
    pay(&mut browser, &signup.username, "pay_items").await;

    let response = browser.get(&path).await.unwrap();
    let chapter: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(chapter["flashcards"].as_array().unwrap().len(), 2);
    assert_eq!(chapter["locked_items"], 0);
}

#[tokio::test]
async fn test_forged_signature_grants_nothing() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut browser = server.browser(LAPTOP);
    let signup = SignupBody::unique();
    signup_and_login(&mut browser, &signup).await;

    let mut signature = TestServer::sign_payment("order_1", "pay_1").unwrap();
    let last = if signature.ends_with('0') { "1" } else { "0" };
    signature.replace_range(signature.len() - 1.., last);

    let response = browser
        .post(
            "/payment/verify-payment",
            &json!({
                "username": signup.username,
                "order_id": "order_1",
                "payment_id": "pay_1",
                "signature": signature,
            }),
        )
        .await
        .unwrap();
    assert_error(response, StatusCode::BAD_REQUEST, "SIGNATURE_INVALID")
        .await
        .unwrap();

    let response = browser
        .get(&format!("/payment/check-premium/{}", signup.username))
        .await
        .unwrap();
    let status: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(status["is_premium"], false);
    assert_eq!(status["device_locked"], false);
}

#[tokio::test]
async fn test_payment_replay_is_rejected() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut alice = server.browser(LAPTOP);
    let signup = SignupBody::unique();
    signup_and_login(&mut alice, &signup).await;

    let response = alice
        .post("/payment/create-order", &username_body(&signup.username))
        .await
        .unwrap();
    let order: OrderBody = assert_json(response, StatusCode::OK).await.unwrap();
    let callback = json!({
        "username": signup.username,
        "order_id": order.order_id,
        "payment_id": "pay_once",
        "signature": TestServer::sign_payment(&order.order_id, "pay_once").unwrap(),
    });

    let response = alice.post("/payment/verify-payment", &callback).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    // Same gateway payment presented a second time
    let response = alice.post("/payment/verify-payment", &callback).await.unwrap();
    assert_error(response, StatusCode::CONFLICT, "PAYMENT_ALREADY_APPLIED")
        .await
        .unwrap();

    let response = alice
        .get(&format!("/payment/check-premium/{}", signup.username))
        .await
        .unwrap();
    let status: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(status["is_premium"], true);
}

#[tokio::test]
async fn test_paid_order_cannot_credit_another_account() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.seed_admin("root", "rootpass").await.unwrap();

    let mut mallory = server.browser(PHONE);
    let signup = SignupBody::unique();
    signup_and_login(&mut mallory, &signup).await;
    let token_before = mallory.cookie("token").map(str::to_string);

    let response = mallory
        .post("/payment/create-order", &username_body(&signup.username))
        .await
        .unwrap();
    let order: OrderBody = assert_json(response, StatusCode::OK).await.unwrap();

    // Genuinely paid and signed, but submitted for the admin account
    let signature = TestServer::sign_payment(&order.order_id, "pay_mallory").unwrap();
    let response = mallory
        .post(
            "/payment/verify-payment",
            &json!({
                "username": "root",
                "order_id": order.order_id,
                "payment_id": "pay_mallory",
                "signature": signature,
            }),
        )
        .await
        .unwrap();
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_error(response, StatusCode::BAD_REQUEST, "SIGNATURE_INVALID")
        .await
        .unwrap();
    assert_eq!(mallory.cookie("token").map(str::to_string), token_before);

    let response = mallory.get("/payment/check-premium/root").await.unwrap();
    let status: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(status["is_premium"], false);
    assert_eq!(status["device_locked"], false);
}

#[tokio::test]
async fn test_device_lock_denies_other_devices_under_deny_policy() {
    let server = TestServer::start_with(&[("DEVICE_LOCK_POLICY", "deny")])
        .await
        .expect("Failed to start server");
    let catalogue = seed_catalogue(&server.content);
    let premium_path = format!("/topics/{}", catalogue.premium_topic);

    let mut laptop = server.browser(LAPTOP);
    let signup = SignupBody::unique();
    signup_and_login(&mut laptop, &signup).await;
    pay(&mut laptop, &signup.username, "pay_lock").await;

    // Same bearer token presented from a different device
    let mut phone = server.browser(PHONE);
    phone.set_cookie("token", laptop.cookie("token").unwrap());
    let response = phone.get(&premium_path).await.unwrap();
    assert_error(response, StatusCode::FORBIDDEN, "DEVICE_NOT_AUTHORIZED")
        .await
        .unwrap();

    let response = laptop.get(&premium_path).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_device_mismatch_is_flagged_by_default() {
    let server = TestServer::start().await.expect("Failed to start server");
    let catalogue = seed_catalogue(&server.content);

    let mut laptop = server.browser(LAPTOP);
    let signup = SignupBody::unique();
    signup_and_login(&mut laptop, &signup).await;
    pay(&mut laptop, &signup.username, "pay_flag").await;

    let mut phone = server.browser(PHONE);
    phone.set_cookie("token", laptop.cookie("token").unwrap());

    let response = phone
        .get(&format!("/topics/{}", catalogue.premium_topic))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = phone.get("/me").await.unwrap();
    let me: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me["device"], "mismatch");
    assert_eq!(me["device_mismatch"], true);
}

// ============================================================================
// Trial tokens and refresh
// ============================================================================

#[tokio::test]
async fn test_trial_token_is_never_premium() {
    let server = TestServer::start().await.expect("Failed to start server");
    let catalogue = seed_catalogue(&server.content);

    let mut laptop = server.browser(LAPTOP);
    let signup = SignupBody::unique();
    signup_and_login(&mut laptop, &signup).await;
    pay(&mut laptop, &signup.username, "pay_trial").await;

    let mut guest = server.browser(PHONE);
    let response = guest
        .post("/create-free-session", &username_body(&signup.username))
        .await
        .unwrap();
    let auth: AuthBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(auth.token_kind, "trial");
    assert!(guest.cookie("token").is_some());
    assert!(guest.cookie("sessionToken").is_none());

    let response = guest
        .get(&format!("/topics/{}", catalogue.premium_topic))
        .await
        .unwrap();
    assert_error(response, StatusCode::FORBIDDEN, "UPGRADE_REQUIRED")
        .await
        .unwrap();

    let response = guest
        .post("/payment/refresh-token", &username_body(&signup.username))
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_refresh_token_reissues_for_own_account_only() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut browser = server.browser(LAPTOP);
    let signup = SignupBody::unique();
    signup_and_login(&mut browser, &signup).await;

    let old_session = browser.cookie("sessionToken").unwrap().to_string();
    let response = browser
        .post("/payment/refresh-token", &username_body(&signup.username))
        .await
        .unwrap();
    let auth: AuthBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(auth.token_kind, "free");
    assert_ne!(browser.cookie("sessionToken").unwrap(), old_session);

    let response = browser
        .post("/payment/refresh-token", &username_body("someone_else"))
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let mut anonymous = server.browser(PHONE);
    let response = anonymous
        .post("/payment/refresh-token", &username_body(&signup.username))
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Administration
// ============================================================================

#[tokio::test]
async fn test_forced_logout_invalidates_session_not_token() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.seed_admin("root", "rootpw").await.unwrap();

    let mut admin = server.browser(LAPTOP);
    let response = admin
        .post("/login", &json!({ "username": "root", "password": "rootpw" }))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let mut user = server.browser(PHONE);
    let signup = SignupBody::unique();
    let auth = signup_and_login(&mut user, &signup).await;

    let response = admin.get("/admin/active-sessions").await.unwrap();
    let sessions: Vec<Value> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(sessions.len(), 2);

    let response = admin
        .post("/admin/force-logout", &json!({ "userId": auth.account.id }))
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["session_cleared"], true);

    let response = user.get("/me").await.unwrap();
    let me: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me["authenticated"], true);
    assert_eq!(me["session_valid"], false);

    let response = admin
        .get(&format!("/admin/user-session/{}", auth.account.id))
        .await
        .unwrap();
    let introspection: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(introspection["session"].is_null());
    assert_eq!(introspection["login_attempts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_routes_require_live_admin_role() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut user = server.browser(PHONE);
    signup_and_login(&mut user, &SignupBody::unique()).await;

    let response = user.get("/admin/active-sessions").await.unwrap();
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN")
        .await
        .unwrap();

    let mut anonymous = server.browser(LAPTOP);
    let response = anonymous.get("/admin/users").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_admin_account_management() {
    let server = TestServer::start().await.expect("Failed to start server");
    let root = server.seed_admin("root", "rootpw").await.unwrap();

    let mut admin = server.browser(LAPTOP);
    let response = admin
        .post("/login", &json!({ "username": "root", "password": "rootpw" }))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = admin
        .post(
            "/admin/users",
            &json!({
                "username": "carol",
                "email": "carol@x.com",
                "password": "pw",
                "subscription_status": "premium",
            }),
        )
        .await
        .unwrap();
    let carol: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(carol["subscription_status"], "premium");

    let response = admin.get("/admin/users?limit=10").await.unwrap();
    let page: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page["data"].as_array().unwrap().len(), 2);
    assert_eq!(page["pagination"]["has_more"], false);

    let response = admin.delete(&format!("/admin/users/{}", root.id)).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let carol_id = carol["id"].as_str().unwrap();
    let response = admin.delete(&format!("/admin/users/{carol_id}")).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = admin.delete(&format!("/admin/users/{carol_id}")).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}
