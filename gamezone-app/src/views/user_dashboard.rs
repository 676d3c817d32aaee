use gamezone_client::Queries;
use gamezone_core::{
    Amount, CreateRecharge, CreateTransaction, FieldError, GameId, Identity, MemberId,
    NormalizedError, Recharge, Transaction, UserDashboard,
};
use serde::Serialize;

use super::{or_fallback, FormError};

pub const PAYMENT_METHODS: &[&str] = &["CARD", "UPI", "CASH", "WALLET"];

#[derive(Debug, Clone, Serialize)]
pub struct UserDashboardView {
    pub member_id: Option<MemberId>,
    pub dashboard: UserDashboard,
    pub error: Option<NormalizedError>,
}

impl UserDashboardView {
    /// Dashboard of the logged-in member. Without a member id (an admin
    /// visiting, or a stale identity) no request is made and the zero
    /// state is shown.
    pub async fn load(queries: &Queries, identity: Option<&Identity>) -> Self {
        let member_id = identity.and_then(|i| i.member_id.clone());
        let read = match &member_id {
            Some(id) => queries.user_dashboard(id).await,
            None => Ok(None),
        };
        let (dashboard, error) = or_fallback(read, UserDashboard::default);
        Self {
            member_id,
            dashboard,
            error,
        }
    }

    pub fn balance(&self) -> Amount {
        self.dashboard.member.balance
    }

    pub async fn recharge(&self, queries: &Queries, form: &RechargeForm) -> Result<Recharge, FormError> {
        let member_id = self.require_member()?;
        let errors = form.validate();
        if !errors.is_empty() {
            return Err(FormError::invalid(errors));
        }
        let request = CreateRecharge {
            member_id,
            amount: form.amount,
            payment_method: form.payment_method.trim().to_string(),
        };
        Ok(queries.recharge(&request).await?)
    }

    pub async fn purchase(
        &self,
        queries: &Queries,
        game_id: &GameId,
        amount: Amount,
    ) -> Result<Transaction, FormError> {
        let member_id = self.require_member()?;
        if game_id.is_blank() {
            return Err(FormError::invalid(vec![FieldError::new("gameId", "Select a game")]));
        }
        let request = CreateTransaction {
            member_id,
            game_id: game_id.clone(),
            amount,
        };
        Ok(queries.purchase(&request).await?)
    }

    fn require_member(&self) -> Result<MemberId, FormError> {
        self.member_id
            .clone()
            .filter(|id| !id.is_blank())
            .ok_or_else(|| FormError::new("Only members can do this"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RechargeForm {
    pub amount: Amount,
    pub payment_method: String,
}

impl RechargeForm {
    pub fn new(amount: Amount, payment_method: impl Into<String>) -> Self {
        Self {
            amount,
            payment_method: payment_method.into(),
        }
    }

    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if !(self.amount.is_finite() && self.amount > 0.0) {
            errors.push(FieldError::new("amount", "Amount must be greater than zero"));
        }
        if self.payment_method.trim().is_empty() {
            errors.push(FieldError::new("paymentMethod", "Choose a payment method"));
        }
        errors
    }
}
