// services/quote_service.rs
use std::collections::HashMap;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, quotedb::QuoteExt, userdb::UserExt},
    dtos::{jobdtos::QuotationAction, quotedtos::*},
    models::quotemodel::{Quote, QuoteRequest, QuoteRequestStatus},
    service::error::ServiceError,
};

/// Admin review happens exactly once, while the request is still pending.
fn check_admin_decision(request: &QuoteRequest) -> Result<(), ServiceError> {
    match request.status {
        QuoteRequestStatus::Pending => Ok(()),
        _ => Err(ServiceError::InvalidQuoteState(
            "Quote request has already been reviewed".to_string(),
        )),
    }
}

/// A tradesperson may quote once an admin let the request through, and may
/// revise the quote until the customer accepts one.
fn check_quote_submission(request: &QuoteRequest) -> Result<(), ServiceError> {
    if !request.admin_approved.unwrap_or(false) {
        return Err(ServiceError::InvalidQuoteState(
            "Quote request has not been approved by an admin".to_string(),
        ));
    }
    if request.client_approved.unwrap_or(false) {
        return Err(ServiceError::InvalidQuoteState(
            "Quote has already been accepted by the customer".to_string(),
        ));
    }
    Ok(())
}

/// The customer decides only after a quote exists, and only once.
fn check_client_decision(request: &QuoteRequest) -> Result<(), ServiceError> {
    if !request.tradesperson_quoted.unwrap_or(false) {
        return Err(ServiceError::InvalidQuoteState(
            "No quote has been submitted yet".to_string(),
        ));
    }
    if request.client_approved.unwrap_or(false) {
        return Err(ServiceError::InvalidQuoteState(
            "Quote has already been accepted".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct QuoteService {
    db_client: Arc<DBClient>,
}

impl QuoteService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn create_quote_request(
        &self,
        dto: CreateQuoteRequestDto,
    ) -> Result<QuoteRequest, ServiceError> {
        self.db_client
            .get_tradesperson_by_id(dto.tradesperson_id)
            .await?
            .ok_or(ServiceError::TradespersonNotFound(dto.tradesperson_id))?;

        if let Some(client_id) = dto.client_id {
            self.db_client
                .get_client_by_id(client_id)
                .await?
                .ok_or(ServiceError::ClientNotFound(client_id))?;
        }

        Ok(self.db_client.create_quote_request(dto).await?)
    }

    pub async fn decide_quote_request(
        &self,
        dto: ApproveQuoteRequestDto,
    ) -> Result<QuoteRequest, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let request = self
            .db_client
            .lock_quote_request(&mut tx, dto.quote_request_id)
            .await?
            .ok_or(ServiceError::QuoteRequestNotFound(dto.quote_request_id))?;

        check_admin_decision(&request)?;

        let approved = dto.action == QuotationAction::Approve;
        let request = self
            .db_client
            .set_admin_decision(&mut tx, dto.quote_request_id, approved)
            .await?;

        tx.commit().await?;
        Ok(request)
    }

    pub async fn submit_quote(&self, dto: SubmitQuoteDto) -> Result<Quote, ServiceError> {
        let amount = BigDecimal::try_from(dto.amount)
            .map_err(|_| ServiceError::Validation("Invalid quote amount".to_string()))?;

        let mut tx = self.db_client.pool.begin().await?;

        let request = self
            .db_client
            .lock_quote_request(&mut tx, dto.quote_request_id)
            .await?
            .ok_or(ServiceError::QuoteRequestNotFound(dto.quote_request_id))?;

        if request.tradesperson_id != dto.tradesperson_id {
            return Err(ServiceError::Forbidden(
                "Quote request was not sent to this tradesperson".to_string(),
            ));
        }
        check_quote_submission(&request)?;

        let quote = self
            .db_client
            .insert_quote(
                &mut tx,
                dto.quote_request_id,
                dto.tradesperson_id,
                amount,
                dto.description,
            )
            .await?;
        self.db_client
            .mark_request_quoted(&mut tx, dto.quote_request_id)
            .await?;

        tx.commit().await?;
        Ok(quote)
    }

    pub async fn decide_quote(&self, dto: ApproveQuoteDto) -> Result<QuoteRequest, ServiceError> {
        let quote = self
            .db_client
            .get_quote_by_id(dto.quote_id)
            .await?
            .ok_or(ServiceError::QuoteNotFound(dto.quote_id))?;

        let mut tx = self.db_client.pool.begin().await?;

        let request = self
            .db_client
            .lock_quote_request(&mut tx, quote.quote_request_id)
            .await?
            .ok_or(ServiceError::QuoteRequestNotFound(quote.quote_request_id))?;

        if let (Some(caller), Some(owner)) = (dto.client_id, request.client_id) {
            if caller != owner {
                return Err(ServiceError::Forbidden(
                    "Quote request belongs to a different client".to_string(),
                ));
            }
        }
        check_client_decision(&request)?;

        let approved = dto.action == QuotationAction::Approve;
        let request = self
            .db_client
            .set_client_decision(&mut tx, dto.quote_id, quote.quote_request_id, approved)
            .await?;

        tx.commit().await?;
        Ok(request)
    }

    /// Customer view: their requests joined with the tradesperson's name and
    /// the most recent quote.
    pub async fn get_customer_quote_requests(
        &self,
        customer_email: &str,
    ) -> Result<Vec<QuoteRequestWithQuote>, ServiceError> {
        let requests = self
            .db_client
            .get_quote_requests_by_email(customer_email)
            .await?;

        let request_ids: Vec<Uuid> = requests.iter().map(|r| r.id).collect();
        let tradesperson_ids: Vec<Uuid> = {
            let mut seen = std::collections::HashSet::new();
            requests
                .iter()
                .map(|r| r.tradesperson_id)
                .filter(|id| seen.insert(*id))
                .collect()
        };

        let tradespeople: HashMap<Uuid, (String, String)> = self
            .db_client
            .get_tradespeople_by_ids(&tradesperson_ids)
            .await?
            .into_iter()
            .map(|t| {
                (
                    t.id,
                    (
                        format!("{} {}", t.first_name, t.last_name),
                        t.trade.to_str().to_string(),
                    ),
                )
            })
            .collect();

        let latest_quotes: HashMap<Uuid, Quote> = self
            .db_client
            .get_latest_quotes_for_requests(&request_ids)
            .await?
            .into_iter()
            .map(|q| (q.quote_request_id, q))
            .collect();

        Ok(requests
            .into_iter()
            .map(|request| {
                let (tradesperson_name, tradesperson_trade) =
                    match tradespeople.get(&request.tradesperson_id) {
                        Some((name, trade)) => (Some(name.clone()), Some(trade.clone())),
                        None => (None, None),
                    };
                let quote = latest_quotes.get(&request.id);
                QuoteRequestWithQuote {
                    tradesperson_name,
                    tradesperson_trade,
                    latest_quote_id: quote.map(|q| q.id),
                    latest_quote_amount: quote.and_then(|q| q.amount.to_f64()),
                    latest_quote_description: quote.and_then(|q| q.description.clone()),
                    request,
                }
            })
            .collect())
    }

    pub async fn get_tradesperson_quote_requests(
        &self,
        tradesperson_id: Uuid,
    ) -> Result<Vec<QuoteRequest>, ServiceError> {
        self.db_client
            .get_tradesperson_by_id(tradesperson_id)
            .await?
            .ok_or(ServiceError::TradespersonNotFound(tradesperson_id))?;

        Ok(self
            .db_client
            .get_quote_requests_by_tradesperson(tradesperson_id)
            .await?)
    }

    pub async fn get_pending_quote_requests(&self) -> Result<Vec<QuoteRequest>, ServiceError> {
        Ok(self.db_client.get_pending_quote_requests().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn request(status: QuoteRequestStatus) -> QuoteRequest {
        QuoteRequest {
            id: Uuid::new_v4(),
            client_id: None,
            tradesperson_id: Uuid::new_v4(),
            customer_name: "Pat Doyle".to_string(),
            customer_email: "pat@example.com".to_string(),
            customer_phone: None,
            project_type: Some("bathroom".to_string()),
            project_description: "Full bathroom refit including tiling".to_string(),
            location: "Leeds".to_string(),
            timeframe: None,
            budget_range: None,
            status,
            admin_approved: Some(matches!(
                status,
                QuoteRequestStatus::AdminApproved
                    | QuoteRequestStatus::Quoted
                    | QuoteRequestStatus::Approved
                    | QuoteRequestStatus::Rejected
            )),
            tradesperson_quoted: Some(matches!(
                status,
                QuoteRequestStatus::Quoted
                    | QuoteRequestStatus::Approved
                    | QuoteRequestStatus::Rejected
            )),
            client_approved: Some(status == QuoteRequestStatus::Approved),
            created_at: Some(Utc::now()),
        }
    }

    #[test]
    fn admin_reviews_only_pending_requests() {
        assert!(check_admin_decision(&request(QuoteRequestStatus::Pending)).is_ok());
        assert!(check_admin_decision(&request(QuoteRequestStatus::AdminApproved)).is_err());
        assert!(check_admin_decision(&request(QuoteRequestStatus::AdminRejected)).is_err());
        assert!(check_admin_decision(&request(QuoteRequestStatus::Quoted)).is_err());
    }

    #[test]
    fn quoting_requires_admin_approval() {
        assert!(check_quote_submission(&request(QuoteRequestStatus::Pending)).is_err());
        assert!(check_quote_submission(&request(QuoteRequestStatus::AdminApproved)).is_ok());
    }

    #[test]
    fn quote_can_be_revised_until_accepted() {
        assert!(check_quote_submission(&request(QuoteRequestStatus::Quoted)).is_ok());
        assert!(check_quote_submission(&request(QuoteRequestStatus::Rejected)).is_ok());
        assert!(check_quote_submission(&request(QuoteRequestStatus::Approved)).is_err());
    }

    #[test]
    fn customer_decides_once_a_quote_exists() {
        assert!(check_client_decision(&request(QuoteRequestStatus::AdminApproved)).is_err());
        assert!(check_client_decision(&request(QuoteRequestStatus::Quoted)).is_ok());
        assert!(check_client_decision(&request(QuoteRequestStatus::Approved)).is_err());
    }
}
