use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use foodgram_auth::JwtClaims;
use foodgram_core::{IngredientId, RecipeId, UserId};
use foodgram_infra::{CartUsageQuery, InMemoryRecipeStore, RecipeStore, StoreError};
use foodgram_recipes::{
    CartMembership, CartUsageRow, Favorite, Ingredient, IngredientUsage, Recipe, RecipeDraft,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{header, StatusCode};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(store: Arc<dyn RecipeStore>) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = foodgram_api::app::build_app_with_store(JWT_SECRET.to_string(), store);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(user: UserId) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn recipe(name: &str, usages: &[(&Ingredient, u32)]) -> Recipe {
    Recipe::new(
        RecipeId::new(),
        UserId::new(),
        RecipeDraft {
            name: name.into(),
            text: "Mix and bake.".into(),
            image: None,
            cooking_time: 30,
            tags: vec![],
            ingredients: usages
                .iter()
                .map(|(i, a)| IngredientUsage::new((*i).clone(), *a))
                .collect(),
        },
    )
    .unwrap()
}

/// Recipe1(Flour:200g, Sugar:100g) and Recipe2(Flour:300g, Egg:2pcs).
async fn seeded_store() -> (Arc<InMemoryRecipeStore>, RecipeId, RecipeId) {
    let store = Arc::new(InMemoryRecipeStore::new());
    let flour = Ingredient::new(IngredientId::new(), "Flour", "g").unwrap();
    let sugar = Ingredient::new(IngredientId::new(), "Sugar", "g").unwrap();
    let egg = Ingredient::new(IngredientId::new(), "Egg", "pcs").unwrap();

    let r1 = recipe("Recipe1", &[(&flour, 200), (&sugar, 100)]);
    let r2 = recipe("Recipe2", &[(&flour, 300), (&egg, 2)]);
    let ids = (r1.id_typed(), r2.id_typed());
    store.save_recipe(r1).await.unwrap();
    store.save_recipe(r2).await.unwrap();

    (store, ids.0, ids.1)
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn(Arc::new(InMemoryRecipeStore::new())).await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/recipes/download_shopping_cart/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/whoami"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_is_public_and_whoami_echoes_the_token_subject() {
    let srv = TestServer::spawn(Arc::new(InMemoryRecipeStore::new())).await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let user = UserId::new();
    let res = client
        .get(srv.url("/whoami"))
        .bearer_auth(mint_jwt(user))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user_id"].as_str().unwrap(), user.to_string());
}

#[tokio::test]
async fn download_sums_overlapping_recipes() {
    let (store, r1, r2) = seeded_store().await;
    let srv = TestServer::spawn(store).await;
    let client = reqwest::Client::new();
    let token = mint_jwt(UserId::new());

    for id in [r1, r2] {
        let res = client
            .post(srv.url(&format!("/recipes/{id}/shopping_cart/")))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .get(srv.url("/recipes/download_shopping_cart/"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=shopping_cart.txt"
    );
    assert!(res.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(
        res.text().await.unwrap(),
        "Egg (pcs) – 2\nFlour (g) – 500\nSugar (g) – 100"
    );
}

#[tokio::test]
async fn empty_cart_downloads_an_empty_file() {
    let (store, _, _) = seeded_store().await;
    let srv = TestServer::spawn(store).await;

    let res = reqwest::Client::new()
        .get(srv.url("/recipes/download_shopping_cart/"))
        .bearer_auth(mint_jwt(UserId::new()))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "");
}

#[tokio::test]
async fn add_to_cart_reports_duplicates_and_unknown_recipes() {
    let (store, r1, _) = seeded_store().await;
    let srv = TestServer::spawn(store).await;
    let client = reqwest::Client::new();
    let user = UserId::new();
    let token = mint_jwt(user);

    let res = client
        .post(srv.url(&format!("/recipes/{r1}/shopping_cart/")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"].as_str().unwrap(), user.to_string());
    assert_eq!(body["recipe"].as_str().unwrap(), r1.to_string());

    let res = client
        .post(srv.url(&format!("/recipes/{r1}/shopping_cart/")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "already_in_cart");

    let res = client
        .post(srv.url(&format!("/recipes/{}/shopping_cart/", RecipeId::new())))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(srv.url("/recipes/not-a-uuid/shopping_cart/"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn removed_recipe_leaves_the_next_download() {
    let (store, r1, r2) = seeded_store().await;
    let user = UserId::new();
    store.add_to_cart(CartMembership::new(user, r1)).await.unwrap();
    store.add_to_cart(CartMembership::new(user, r2)).await.unwrap();
    let srv = TestServer::spawn(store).await;
    let client = reqwest::Client::new();
    let token = mint_jwt(user);

    let res = client
        .delete(srv.url(&format!("/recipes/{r2}/shopping_cart/")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .delete(srv.url(&format!("/recipes/{r2}/shopping_cart/")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = client
        .get(srv.url("/recipes/download_shopping_cart/"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "Flour (g) – 200\nSugar (g) – 100");
}

#[tokio::test]
async fn carts_are_per_user() {
    let (store, r1, r2) = seeded_store().await;
    let alice = UserId::new();
    let bob = UserId::new();
    store.add_to_cart(CartMembership::new(alice, r1)).await.unwrap();
    store.add_to_cart(CartMembership::new(bob, r2)).await.unwrap();
    let srv = TestServer::spawn(store).await;

    let body = reqwest::Client::new()
        .get(srv.url("/recipes/download_shopping_cart/"))
        .bearer_auth(mint_jwt(bob))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "Egg (pcs) – 2\nFlour (g) – 300");
}

#[tokio::test]
async fn favorite_lifecycle() {
    let (store, r1, _) = seeded_store().await;
    let srv = TestServer::spawn(store).await;
    let client = reqwest::Client::new();
    let user = UserId::new();
    let token = mint_jwt(user);
    let url = srv.url(&format!("/recipes/{r1}/favorite/"));

    let res = client.post(&url).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"].as_str().unwrap(), user.to_string());
    assert_eq!(body["recipe"].as_str().unwrap(), r1.to_string());

    let res = client.post(&url).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "already_favorite");

    // Favorites never feed the shopping list.
    let body = client
        .get(srv.url("/recipes/download_shopping_cart/"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "");

    let res = client.delete(&url).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = client.delete(&url).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(srv.url(&format!("/recipes/{}/favorite/", RecipeId::new())))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

/// A store whose backend is unreachable.
struct DownStore;

#[async_trait::async_trait]
impl CartUsageQuery for DownStore {
    async fn cart_usages(&self, _user_id: UserId) -> Result<Vec<CartUsageRow>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[async_trait::async_trait]
impl RecipeStore for DownStore {
    async fn save_recipe(&self, _recipe: Recipe) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn get_recipe(&self, _recipe_id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn delete_recipe(&self, _recipe_id: RecipeId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn add_to_cart(&self, _membership: CartMembership) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn remove_from_cart(&self, _membership: CartMembership) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn add_favorite(&self, _favorite: Favorite) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn remove_favorite(&self, _favorite: Favorite) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn storage_outage_is_a_distinct_503() {
    let srv = TestServer::spawn(Arc::new(DownStore)).await;

    let res = reqwest::Client::new()
        .get(srv.url("/recipes/download_shopping_cart/"))
        .bearer_auth(mint_jwt(UserId::new()))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "aggregation_unavailable");
}
