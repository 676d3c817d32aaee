use gamezone_core::{ApiResult, Product, ProductForm, ProductId};

use super::id_path;
use crate::http::HttpClient;

/// Shop products.
#[derive(Debug, Clone)]
pub struct ProductsClient {
    http: HttpClient,
}

impl ProductsClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// `GET /products`.
    pub async fn list(&self) -> ApiResult<Vec<Product>> {
        self.http.get_json("/products").await
    }

    /// `GET /products/:id`.
    pub async fn get(&self, id: &ProductId) -> ApiResult<Product> {
        self.http.get_json(&id_path("/products", id.as_str())?).await
    }

    /// `POST /products`.
    pub async fn create(&self, form: &ProductForm) -> ApiResult<Product> {
        self.http.post_json("/products", form).await
    }

    /// `PUT /products/:id`.
    pub async fn update(&self, id: &ProductId, form: &ProductForm) -> ApiResult<Product> {
        self.http
            .put_json(&id_path("/products", id.as_str())?, form)
            .await
    }

    /// `DELETE /products/:id`.
    pub async fn delete(&self, id: &ProductId) -> ApiResult<()> {
        self.http.delete(&id_path("/products", id.as_str())?).await
    }
}
