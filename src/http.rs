//! HTTP API for the registrar
//!
//! ## Endpoints
//!
//! - `POST /register` - Register a credential in both stores
//! - `GET  /health` - Health check with row counts
//! - `GET  /stakeholder?rfid={tag}` - Look up one stakeholder
//! - `GET  /stakeholders` - Roster listing, newest first
//! - `POST /update` - Update a stakeholder's profile fields
//! - `POST /renew` - Renew a credential's validity for another year
//!
//! ## Example Usage
//!
//! ```bash
//! curl -X POST -H "Content-Type: application/json" \
//!      -d '{"rfid":"04A1B2C3","role":"student","first_name":"Ana","last_name":"Reyes"}' \
//!      http://localhost:8070/register
//!
//! curl 'http://localhost:8070/stakeholder?rfid=04A1B2C3'
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{Months, Utc};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{header, Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::db::{self, identity, AccessDb, IdentityDb};
use crate::error::RegistrarError;
use crate::registration::{Registrar, RegistrationRequest, RegistrationResponse};

/// HTTP server state
pub struct HttpServer {
    registrar: Arc<Registrar>,
    identity_db: Arc<IdentityDb>,
    access_db: Arc<AccessDb>,
    bind_addr: SocketAddr,
}

#[derive(Debug, Deserialize)]
struct RenewRequest {
    #[serde(default)]
    rfid: String,
}

impl HttpServer {
    pub fn new(
        registrar: Arc<Registrar>,
        identity_db: Arc<IdentityDb>,
        access_db: Arc<AccessDb>,
        bind_addr: SocketAddr,
    ) -> Self {
        Self {
            registrar,
            identity_db,
            access_db,
            bind_addr,
        }
    }

    /// Run the HTTP server
    pub async fn run(self: Arc<Self>) -> Result<(), RegistrarError> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        info!(addr = %self.bind_addr, "HTTP server listening");

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let server = self.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let server = server.clone();
                    async move { server.handle_request(req).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    warn!(addr = %remote_addr, error = %err, "Connection error");
                }
            });
        }
    }

    /// Route requests to handlers
    async fn handle_request(
        &self,
        req: Request<Incoming>,
    ) -> Result<Response<Full<Bytes>>, hyper::Error> {
        let path = req.uri().path().to_string();
        let query = req.uri().query().unwrap_or("").to_string();
        let method = req.method().clone();

        debug!(method = %method, path = %path, "Incoming request");

        let result = match (method, path.as_str()) {
            (Method::GET, "/health") => self.handle_health(),
            (Method::POST, "/register") => self.handle_register(req).await,
            (Method::GET, "/stakeholder") => self.handle_lookup(&query),
            (Method::GET, "/stakeholders") => self.handle_list(),
            (Method::POST, "/update") => self.handle_update(req).await,
            (Method::POST, "/renew") => self.handle_renew(req).await,
            _ => Ok(json_response(
                StatusCode::NOT_FOUND,
                &serde_json::json!({ "error": "Not found" }),
            )),
        };

        match result {
            Ok(response) => Ok(response),
            Err(err) => {
                warn!(path = %path, error = %err, "Request failed");
                Ok(json_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &serde_json::json!({ "success": false, "message": err.to_string() }),
                ))
            }
        }
    }

    fn handle_health(&self) -> Result<Response<Full<Bytes>>, RegistrarError> {
        let stats = db::stats(&self.identity_db, &self.access_db)?;
        Ok(json_response(
            StatusCode::OK,
            &serde_json::json!({
                "status": "ok",
                "stakeholders": stats.stakeholder_count,
                "links": stats.link_count,
            }),
        ))
    }

    async fn handle_register(
        &self,
        req: Request<Incoming>,
    ) -> Result<Response<Full<Bytes>>, RegistrarError> {
        let request: RegistrationRequest = read_json_body(req).await?;
        let response = self.registrar.register(request);
        let status = if response.success {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Ok(json_response(status, &response))
    }

    fn handle_lookup(&self, query: &str) -> Result<Response<Full<Bytes>>, RegistrarError> {
        let rfid = query_param(query, "rfid")
            .ok_or_else(|| RegistrarError::Validation("Missing RFID".to_string()))?;

        let row = self
            .identity_db
            .with_conn(|conn| identity::get_by_rfid(conn, rfid.trim()))?;

        match row {
            Some(row) => Ok(json_response(StatusCode::OK, &row)),
            None => Ok(json_response(StatusCode::OK, &serde_json::json!({}))),
        }
    }

    fn handle_list(&self) -> Result<Response<Full<Bytes>>, RegistrarError> {
        let rows = self.identity_db.with_conn(identity::list_stakeholders)?;
        Ok(json_response(StatusCode::OK, &rows))
    }

    async fn handle_update(
        &self,
        req: Request<Incoming>,
    ) -> Result<Response<Full<Bytes>>, RegistrarError> {
        let mut update: identity::StakeholderUpdate = read_json_body(req).await?;
        update.rfid = update.rfid.trim().to_string();
        if update.rfid.is_empty() {
            return Ok(json_response(
                StatusCode::OK,
                &RegistrationResponse::failed("No RFID provided."),
            ));
        }

        let updated = self
            .identity_db
            .with_conn(|conn| identity::update_stakeholder(conn, &update))?;

        let response = if updated {
            info!(rfid = %update.rfid, "Stakeholder profile updated");
            RegistrationResponse::ok("Stakeholder updated successfully.")
        } else {
            RegistrationResponse::failed(format!("RFID {} is not registered.", update.rfid))
        };

        Ok(json_response(StatusCode::OK, &response))
    }

    async fn handle_renew(
        &self,
        req: Request<Incoming>,
    ) -> Result<Response<Full<Bytes>>, RegistrarError> {
        let request: RenewRequest = read_json_body(req).await?;
        let rfid = request.rfid.trim().to_string();
        if rfid.is_empty() {
            return Ok(json_response(
                StatusCode::OK,
                &RegistrationResponse::failed("No RFID provided."),
            ));
        }

        let renewed = self
            .identity_db
            .with_conn(|conn| identity::renew_validity(conn, &rfid))?;

        let response = if renewed {
            let expiry = Utc::now()
                .date_naive()
                .checked_add_months(Months::new(12))
                .map(|d| d.to_string())
                .unwrap_or_default();
            info!(rfid = %rfid, expiry = %expiry, "Validity renewed");
            RegistrationResponse::ok(format!(
                "RFID {} renewed successfully. New expiration: {}",
                rfid, expiry
            ))
        } else {
            RegistrationResponse::failed(format!("RFID {} is not registered.", rfid))
        };

        Ok(json_response(StatusCode::OK, &response))
    }
}

/// Collect and deserialize a JSON request body
async fn read_json_body<T: serde::de::DeserializeOwned>(
    req: Request<Incoming>,
) -> Result<T, RegistrarError> {
    let body = req
        .into_body()
        .collect()
        .await
        .map_err(|e| RegistrarError::Validation(format!("Failed to read body: {}", e)))?
        .to_bytes();

    if body.is_empty() {
        return Err(RegistrarError::Validation("No data received".to_string()));
    }

    serde_json::from_slice(&body)
        .map_err(|e| RegistrarError::Validation(format!("Invalid JSON: {}", e)))
}

/// Extract one query-string parameter
fn query_param(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Build a JSON response
fn json_response<T: serde::Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_vec(body).unwrap_or_else(|_| b"{}".to_vec());
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}
