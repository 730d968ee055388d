//! # HTTP Routes
//!
//! ```text
//! GET  /health                                   → "OK"
//! GET  /api/method/get_shipping_address          → {"message": {name, display} | null}
//! POST /api/resource/address                     → saved Address
//! GET  /api/resource/address/{name}              → Address
//! POST /api/resource/customer                    → saved Customer
//! GET  /api/resource/customer/{name}             → Customer
//! PUT  /api/resource/customer/{name}/primary-address → Customer, display re-rendered
//! PUT  /api/resource/address-template            → saved AddressTemplate
//! ```

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use address_core::display::check_template;
use address_core::{Address, AddressTemplate, CoreError, Customer, ShippingAddress};
use address_db::{get_address_display, get_shipping_address, Database};

use crate::error::{ApiError, ApiResult};

/// Shared application state.
pub struct AppState {
    pub db: Database,
}

/// Envelope for `/api/method/*` responses.
#[derive(Debug, Serialize)]
pub struct MethodResponse<T> {
    pub message: T,
}

/// Body of the primary-address change. `null` or blank clears it.
#[derive(Debug, Deserialize)]
pub struct PrimaryAddressRequest {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShippingQuery {
    pub company: Option<String>,
    pub address: Option<String>,
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/method/get_shipping_address", get(shipping_address_handler))
        .route("/api/resource/address", post(save_address_handler))
        .route("/api/resource/address/{name}", get(get_address_handler))
        .route("/api/resource/customer", post(save_customer_handler))
        .route("/api/resource/customer/{name}", get(get_customer_handler))
        .route(
            "/api/resource/customer/{name}/primary-address",
            put(set_primary_address_handler),
        )
        .route("/api/resource/address-template", put(put_template_handler))
        .with_state(state)
}

/// Health check endpoint.
async fn health_handler() -> impl IntoResponse {
    "OK"
}

async fn shipping_address_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ShippingQuery>,
) -> ApiResult<Json<MethodResponse<Option<ShippingAddress>>>> {
    let company = query
        .company
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("company is required"))?;

    let found = get_shipping_address(&state.db, company, query.address.as_deref()).await?;
    debug!(company = %company, found = found.is_some(), "Shipping address lookup");

    Ok(Json(MethodResponse { message: found }))
}

async fn save_address_handler(
    State(state): State<Arc<AppState>>,
    Json(address): Json<Address>,
) -> ApiResult<Json<Address>> {
    let saved = state.db.lifecycle().save(address).await?;
    Ok(Json(saved))
}

async fn get_address_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<Address>> {
    state
        .db
        .addresses()
        .get_by_name(&name)
        .await?
        .map(Json)
        .ok_or_else(|| CoreError::AddressNotFound(name).into())
}

/// Creates a customer. A chosen primary address is rendered into
/// `primary_address` right away.
async fn save_customer_handler(
    State(state): State<Arc<AppState>>,
    Json(mut customer): Json<Customer>,
) -> ApiResult<Json<Customer>> {
    if customer.name.trim().is_empty() {
        customer.name = customer.customer_name.trim().to_string();
    }
    if customer.name.is_empty() {
        return Err(ApiError::bad_request("customer_name is required"));
    }

    customer.customer_primary_address = customer
        .customer_primary_address
        .take()
        .filter(|a| !a.trim().is_empty());

    customer.primary_address = match customer.customer_primary_address.as_deref() {
        Some(address) => Some(
            get_address_display(&state.db, address)
                .await?
                .ok_or_else(|| CoreError::AddressNotFound(address.to_string()))?,
        ),
        None => None,
    };

    state.db.customers().insert(&customer).await?;
    info!(customer = %customer.name, "Customer created");

    Ok(Json(customer))
}

async fn get_customer_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<Customer>> {
    state
        .db
        .customers()
        .get_by_name(&name)
        .await?
        .map(Json)
        .ok_or_else(|| CoreError::CustomerNotFound(name).into())
}

async fn set_primary_address_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<PrimaryAddressRequest>,
) -> ApiResult<Json<Customer>> {
    let address = request
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());

    let display = match address {
        Some(address) => Some(
            get_address_display(&state.db, address)
                .await?
                .ok_or_else(|| CoreError::AddressNotFound(address.to_string()))?,
        ),
        None => None,
    };

    let customers = state.db.customers();
    customers
        .set_customer_primary_address(&name, address, display.as_deref())
        .await?;
    info!(customer = %name, address = ?address, "Customer primary address changed");

    customers
        .get_by_name(&name)
        .await?
        .map(Json)
        .ok_or_else(|| CoreError::CustomerNotFound(name).into())
}

async fn put_template_handler(
    State(state): State<Arc<AppState>>,
    Json(template): Json<AddressTemplate>,
) -> ApiResult<Json<AddressTemplate>> {
    if template.country.trim().is_empty() {
        return Err(ApiError::bad_request("country is required"));
    }
    if template.template.trim().is_empty() {
        return Err(ApiError::bad_request("template is required"));
    }
    check_template(&template.template).map_err(CoreError::from)?;

    state.db.templates().upsert(&template).await?;
    info!(country = %template.country, default = template.is_default, "Address template saved");

    Ok(Json(template))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use address_core::{AddressLink, AddressType};
    use address_db::DbConfig;

    async fn state() -> Arc<AppState> {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Arc::new(AppState { db })
    }

    fn company_address(title: &str, company: &str, shipping: bool) -> Address {
        let mut a = Address::new(title, "1 Dock Road", "Springfield", "United States");
        a.address_type = if shipping { AddressType::Shipping } else { AddressType::Billing };
        a.is_shipping_address = shipping;
        a.links.push(AddressLink::company(company));
        a
    }

    fn query(company: Option<&str>, address: Option<&str>) -> Query<ShippingQuery> {
        Query(ShippingQuery {
            company: company.map(String::from),
            address: address.map(String::from),
        })
    }

    #[tokio::test]
    async fn test_shipping_address_message() {
        let state = state().await;
        let Json(saved) = save_address_handler(State(state.clone()), Json(company_address("Acme", "Acme", true)))
            .await
            .unwrap();
        assert_eq!(saved.name, "Acme-Shipping");
        assert!(saved.is_your_company_address);

        let Json(resp) = shipping_address_handler(State(state.clone()), query(Some("Acme"), None))
            .await
            .unwrap();
        let found = resp.message.unwrap();
        assert_eq!(found.name, "Acme-Shipping");
        assert_eq!(found.display, "1 Dock Road<br>Springfield<br>United States<br>");

        let json = serde_json::to_value(MethodResponse {
            message: Some(found),
        })
        .unwrap();
        assert_eq!(json["message"]["name"], "Acme-Shipping");
    }

    #[tokio::test]
    async fn test_shipping_address_null_message() {
        let state = state().await;
        let Json(resp) = shipping_address_handler(State(state), query(Some("Globex"), None))
            .await
            .unwrap();
        assert!(resp.message.is_none());
        assert_eq!(
            serde_json::to_string(&resp).unwrap(),
            r#"{"message":null}"#
        );
    }

    #[tokio::test]
    async fn test_shipping_address_requires_company() {
        let state = state().await;
        let err = shipping_address_handler(State(state), query(Some("  "), None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BadRequest);
    }

    #[tokio::test]
    async fn test_save_rejects_unlinked_company_address() {
        let state = state().await;
        let mut address = Address::new("Acme", "1 Main St", "Springfield", "United States");
        address.is_your_company_address = true;

        let err = save_address_handler(State(state), Json(address)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.title, "Company Not Linked");
    }

    #[tokio::test]
    async fn test_customer_primary_address_rendered_on_create() {
        let state = state().await;
        let mut address = Address::new("Bob", "742 Evergreen Terrace", "Springfield", "United States");
        address.links.push(AddressLink::new("Customer", "Bob"));
        let Json(address) = save_address_handler(State(state.clone()), Json(address)).await.unwrap();

        let customer = Customer {
            name: String::new(),
            customer_name: "Bob".to_string(),
            email_id: None,
            customer_primary_address: Some(address.name.clone()),
            primary_address: None,
        };
        let Json(created) = save_customer_handler(State(state.clone()), Json(customer)).await.unwrap();
        assert_eq!(created.name, "Bob");
        assert_eq!(
            created.primary_address.as_deref(),
            Some("742 Evergreen Terrace<br>Springfield<br>United States<br>")
        );

        let Json(loaded) = get_customer_handler(State(state), Path("Bob".to_string())).await.unwrap();
        assert_eq!(loaded.customer_primary_address.as_deref(), Some(address.name.as_str()));
    }

    #[tokio::test]
    async fn test_customer_with_unknown_address() {
        let state = state().await;
        let customer = Customer {
            name: "Bob".to_string(),
            customer_name: "Bob".to_string(),
            email_id: None,
            customer_primary_address: Some("Nowhere-Billing".to_string()),
            primary_address: None,
        };
        let err = save_customer_handler(State(state), Json(customer)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_get_missing_records() {
        let state = state().await;
        let err = get_address_handler(State(state.clone()), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = get_customer_handler(State(state), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_template_changes_display() {
        let state = state().await;
        let template = AddressTemplate {
            country: "United States".to_string(),
            template: "{{address_line1}}\n{{city}}".to_string(),
            is_default: false,
        };
        put_template_handler(State(state.clone()), Json(template)).await.unwrap();
        save_address_handler(State(state.clone()), Json(company_address("Acme", "Acme", true)))
            .await
            .unwrap();

        let Json(resp) = shipping_address_handler(State(state), query(Some("Acme"), Some("Acme-Shipping")))
            .await
            .unwrap();
        assert_eq!(resp.message.unwrap().display, "1 Dock Road<br>Springfield<br>");
    }

    #[tokio::test]
    async fn test_template_requires_country() {
        let state = state().await;
        let template = AddressTemplate {
            country: " ".to_string(),
            template: "{{city}}".to_string(),
            is_default: true,
        };
        let err = put_template_handler(State(state), Json(template)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BadRequest);
    }

    #[tokio::test]
    async fn test_malformed_template_rejected() {
        let state = state().await;
        let template = AddressTemplate {
            country: "United States".to_string(),
            template: "{{address_line1}}\nShip {{city".to_string(),
            is_default: false,
        };
        let err = put_template_handler(State(state.clone()), Json(template)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(state.db.templates().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_change_customer_primary_address() {
        let state = state().await;
        let mut address = Address::new("Bob", "742 Evergreen Terrace", "Springfield", "United States");
        address.links.push(AddressLink::new("Customer", "Bob"));
        let Json(address) = save_address_handler(State(state.clone()), Json(address)).await.unwrap();

        let customer = Customer {
            name: "Bob".to_string(),
            customer_name: "Bob".to_string(),
            email_id: None,
            customer_primary_address: None,
            primary_address: None,
        };
        save_customer_handler(State(state.clone()), Json(customer)).await.unwrap();

        let Json(bob) = set_primary_address_handler(
            State(state.clone()),
            Path("Bob".to_string()),
            Json(PrimaryAddressRequest { address: Some(address.name.clone()) }),
        )
        .await
        .unwrap();
        assert_eq!(bob.customer_primary_address.as_deref(), Some(address.name.as_str()));
        assert_eq!(
            bob.primary_address.as_deref(),
            Some("742 Evergreen Terrace<br>Springfield<br>United States<br>")
        );

        let Json(bob) = set_primary_address_handler(
            State(state.clone()),
            Path("Bob".to_string()),
            Json(PrimaryAddressRequest { address: Some(" ".to_string()) }),
        )
        .await
        .unwrap();
        assert!(bob.customer_primary_address.is_none());
        assert!(bob.primary_address.is_none());

        let err = set_primary_address_handler(
            State(state),
            Path("Nobody".to_string()),
            Json(PrimaryAddressRequest { address: None }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
