//! Admin dashboard and management sections.

use gamezone_client::Queries;
use gamezone_core::{
    AdminStats, FieldError, Game, GameForm, GameId, GameListParams, Member, MemberForm, MemberId,
    NormalizedError, Product, ProductForm, ProductId, Recharge, Transaction,
};
use serde::Serialize;

use super::{or_fallback, FormError};
use crate::nav::AdminSection;

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboardView {
    pub stats: AdminStats,
    pub error: Option<NormalizedError>,
}

impl AdminDashboardView {
    pub async fn load(queries: &Queries) -> Self {
        let (stats, error) = or_fallback(queries.admin_stats().await, AdminStats::default);
        Self { stats, error }
    }
}

/// One management list.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "section", content = "items", rename_all = "snake_case")]
pub enum SectionItems {
    Games(Vec<Game>),
    Members(Vec<Member>),
    Products(Vec<Product>),
    Transactions(Vec<Transaction>),
    Recharges(Vec<Recharge>),
}

impl SectionItems {
    pub fn len(&self) -> usize {
        match self {
            SectionItems::Games(items) => items.len(),
            SectionItems::Members(items) => items.len(),
            SectionItems::Products(items) => items.len(),
            SectionItems::Transactions(items) => items.len(),
            SectionItems::Recharges(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminSectionView {
    pub items: SectionItems,
    pub error: Option<NormalizedError>,
}

impl AdminSectionView {
    /// Load the list behind `section`. `Overview` has no list and loads as
    /// an empty games section; use [`AdminDashboardView`] for it.
    pub async fn load(queries: &Queries, section: AdminSection) -> Self {
        let (items, error) = match section {
            AdminSection::Games | AdminSection::Overview => {
                let (items, error) = or_fallback(queries.games(&GameListParams::new()).await, Vec::new);
                (SectionItems::Games(items), error)
            }
            AdminSection::Members => {
                let (items, error) = or_fallback(queries.members().await, Vec::new);
                (SectionItems::Members(items), error)
            }
            AdminSection::Products => {
                let (items, error) = or_fallback(queries.products().await, Vec::new);
                (SectionItems::Products(items), error)
            }
            AdminSection::Transactions => {
                let (items, error) = or_fallback(queries.transactions().await, Vec::new);
                (SectionItems::Transactions(items), error)
            }
            AdminSection::Recharges => {
                let (items, error) = or_fallback(queries.recharges().await, Vec::new);
                (SectionItems::Recharges(items), error)
            }
        };
        Self { items, error }
    }
}

// ============================================================================
// CRUD ACTIONS
// ============================================================================

pub fn validate_game(form: &GameForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if form.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if !(form.price.is_finite() && form.price >= 0.0) {
        errors.push(FieldError::new("price", "Price must be zero or more"));
    }
    errors
}

pub fn validate_product(form: &ProductForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if form.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if !(form.price.is_finite() && form.price >= 0.0) {
        errors.push(FieldError::new("price", "Price must be zero or more"));
    }
    if form.stock < 0 {
        errors.push(FieldError::new("stock", "Stock cannot be negative"));
    }
    errors
}

fn checked(errors: Vec<FieldError>) -> Result<(), FormError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(FormError::invalid(errors))
    }
}

pub async fn save_game(queries: &Queries, id: Option<&GameId>, form: &GameForm) -> Result<Game, FormError> {
    checked(validate_game(form))?;
    let saved = match id {
        Some(id) => queries.update_game(id, form).await?,
        None => queries.create_game(form).await?,
    };
    Ok(saved)
}

pub async fn delete_game(queries: &Queries, id: &GameId) -> Result<(), FormError> {
    Ok(queries.delete_game(id).await?)
}

pub async fn save_product(
    queries: &Queries,
    id: Option<&ProductId>,
    form: &ProductForm,
) -> Result<Product, FormError> {
    checked(validate_product(form))?;
    let saved = match id {
        Some(id) => queries.update_product(id, form).await?,
        None => queries.create_product(form).await?,
    };
    Ok(saved)
}

pub async fn delete_product(queries: &Queries, id: &ProductId) -> Result<(), FormError> {
    Ok(queries.delete_product(id).await?)
}

pub async fn update_member(queries: &Queries, id: &MemberId, form: &MemberForm) -> Result<Member, FormError> {
    let mut errors = Vec::new();
    if form.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if !form.email.contains('@') {
        errors.push(FieldError::new("email", "Email must contain @"));
    }
    checked(errors)?;
    Ok(queries.update_member(id, form).await?)
}

pub async fn delete_member(queries: &Queries, id: &MemberId) -> Result<(), FormError> {
    Ok(queries.delete_member(id).await?)
}
