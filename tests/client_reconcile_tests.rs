//! # Client Reconciler Tests
//!
//! Drives `ClientResource` against the in-memory Dex double.
//!
//! These tests verify:
//! - Secret generation and carry-forward across updates
//! - Adoption of clients that already exist in Dex
//! - Dry runs never call Dex
//! - Immutable fields and delete verification
//! - Deadline handling and the `GetClient` fallback

mod common;

use common::{context, MockDex};
use dex_reconciler::remote::RemoteClient;
use dex_reconciler::resources::{
    ClientInputs, ClientResource, ClientState, CreateRequest, DeleteRequest, ReadRequest,
    UpdateRequest,
};
use dex_reconciler::{ReconcileError, Resource, SecretString};
use std::sync::Arc;

fn web_app() -> ClientInputs {
    ClientInputs {
        client_id: "web-app".to_string(),
        name: "Web App".to_string(),
        redirect_uris: vec!["https://app.example/cb".to_string()],
        ..ClientInputs::default()
    }
}

fn create(inputs: ClientInputs) -> CreateRequest<ClientInputs> {
    CreateRequest {
        inputs,
        dry_run: false,
    }
}

#[tokio::test]
async fn test_web_app_lifecycle() {
    let dex = Arc::new(MockDex::new());
    let ctx = context(&dex);

    let created = ClientResource.create(&ctx, create(web_app())).await.unwrap();
    assert_eq!(created.id, "web-app");
    let secret = created.state.inputs.secret.clone().unwrap();
    assert_eq!(secret.expose().len(), 44);
    assert_eq!(
        created.state.inputs.redirect_uris,
        vec!["https://app.example/cb".to_string()]
    );
    assert!(created.state.created_at.is_some());
    assert_eq!(dex.client("web-app").unwrap().secret, secret);

    let renamed = ClientInputs {
        name: "Web Application".to_string(),
        ..web_app()
    };
    let updated = ClientResource
        .update(
            &ctx,
            UpdateRequest {
                id: created.id.clone(),
                inputs: renamed,
                state: created.state.clone(),
                dry_run: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.inputs.name, "Web Application");
    assert_eq!(updated.inputs.secret, Some(secret.clone()));
    assert_eq!(updated.created_at, created.state.created_at);

    let stored = dex.client("web-app").unwrap();
    assert_eq!(stored.name, "Web Application");
    assert_eq!(stored.secret, secret);

    ClientResource
        .delete(
            &ctx,
            DeleteRequest {
                id: created.id,
                state: updated,
            },
        )
        .await
        .unwrap();
    assert!(dex.client("web-app").is_none());
}

#[tokio::test]
async fn test_generated_secrets_are_distinct_and_supplied_secret_is_kept() {
    let dex = Arc::new(MockDex::new());
    let ctx = context(&dex);

    let first = ClientResource.create(&ctx, create(web_app())).await.unwrap();
    let second = ClientResource
        .create(
            &ctx,
            create(ClientInputs {
                client_id: "other-app".to_string(),
                ..web_app()
            }),
        )
        .await
        .unwrap();
    assert_ne!(first.state.inputs.secret, second.state.inputs.secret);

    let supplied = ClientResource
        .create(
            &ctx,
            create(ClientInputs {
                client_id: "cli".to_string(),
                secret: Some(SecretString::new("caller-chosen")),
                ..web_app()
            }),
        )
        .await
        .unwrap();
    assert_eq!(
        supplied.state.inputs.secret.unwrap().expose(),
        "caller-chosen"
    );
    assert_eq!(dex.client("cli").unwrap().secret.expose(), "caller-chosen");
}

#[tokio::test]
async fn test_create_is_idempotent_through_adoption() {
    let dex = Arc::new(MockDex::new());
    let ctx = context(&dex);

    let first = ClientResource.create(&ctx, create(web_app())).await.unwrap();
    dex.clear_calls();

    let second = ClientResource.create(&ctx, create(web_app())).await.unwrap();
    assert_eq!(second.id, first.id);
    // Dex stores no creation time, so only the call that created the client
    // can stamp it; everything Dex holds must match.
    assert!(first.state.created_at.is_some());
    assert_eq!(
        second.state,
        ClientState {
            created_at: None,
            ..first.state.clone()
        }
    );
    assert_eq!(dex.calls(), vec!["create_client", "get_client"]);
}

#[tokio::test]
async fn test_adoption_reports_what_dex_has() {
    let dex = Arc::new(MockDex::new().with_client(RemoteClient {
        id: "web-app".to_string(),
        name: "Legacy Name".to_string(),
        secret: SecretString::new("existing"),
        ..RemoteClient::default()
    }));
    let ctx = context(&dex);

    let adopted = ClientResource.create(&ctx, create(web_app())).await.unwrap();
    assert_eq!(adopted.state.inputs.name, "Legacy Name");
    assert_eq!(adopted.state.inputs.secret.unwrap().expose(), "existing");
}

#[tokio::test]
async fn test_dry_run_create_and_update_make_no_calls() {
    let dex = Arc::new(MockDex::new());
    let ctx = context(&dex);

    let preview = ClientResource
        .create(
            &ctx,
            CreateRequest {
                inputs: web_app(),
                dry_run: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(preview.state.inputs, web_app());
    assert_eq!(preview.state.created_at, None);

    let prior = ClientState {
        inputs: ClientInputs {
            secret: Some(SecretString::new("kept")),
            ..web_app()
        },
        created_at: Some("2026-01-01T00:00:00Z".to_string()),
    };
    let preview = ClientResource
        .update(
            &ctx,
            UpdateRequest {
                id: "web-app".to_string(),
                inputs: web_app(),
                state: prior,
                dry_run: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(preview.inputs.secret.unwrap().expose(), "kept");
    assert_eq!(preview.created_at.as_deref(), Some("2026-01-01T00:00:00Z"));

    assert!(dex.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_inputs_make_no_calls() {
    let dex = Arc::new(MockDex::new());
    let ctx = context(&dex);

    let err = ClientResource
        .create(
            &ctx,
            create(ClientInputs {
                name: String::new(),
                ..web_app()
            }),
        )
        .await
        .unwrap_err();
    let failures = err.failures().unwrap();
    assert_eq!(failures[0].property, "name");
    assert!(dex.calls().is_empty());
}

#[tokio::test]
async fn test_immutable_fields_are_rejected_before_any_call() {
    let dex = Arc::new(MockDex::new());
    let ctx = context(&dex);
    let prior = ClientState {
        inputs: web_app(),
        created_at: None,
    };

    let err = ClientResource
        .update(
            &ctx,
            UpdateRequest {
                id: "web-app".to_string(),
                inputs: ClientInputs {
                    client_id: "renamed-app".to_string(),
                    ..web_app()
                },
                state: prior.clone(),
                dry_run: false,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.failures().unwrap()[0].property, "clientId");

    let err = ClientResource
        .update(
            &ctx,
            UpdateRequest {
                id: "web-app".to_string(),
                inputs: ClientInputs {
                    public: true,
                    ..web_app()
                },
                state: prior,
                dry_run: false,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReconcileError::ReplaceRequired { field: "public", .. }
    ));

    assert!(dex.calls().is_empty());
}

#[tokio::test]
async fn test_update_of_missing_client_is_not_found() {
    let dex = Arc::new(MockDex::new());
    let ctx = context(&dex);

    let err = ClientResource
        .update(
            &ctx,
            UpdateRequest {
                id: "web-app".to_string(),
                inputs: web_app(),
                state: ClientState {
                    inputs: web_app(),
                    created_at: None,
                },
                dry_run: false,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_verification_fails_when_client_lingers() {
    let dex = Arc::new(MockDex::new().keep_after_delete());
    let ctx = context(&dex);
    ClientResource.create(&ctx, create(web_app())).await.unwrap();
    dex.clear_calls();

    let err = ClientResource
        .delete(
            &ctx,
            DeleteRequest {
                id: "web-app".to_string(),
                state: ClientState::default(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::VerificationFailed { .. }));
    assert_eq!(dex.calls(), vec!["delete_client", "list_clients"]);
}

#[tokio::test]
async fn test_delete_of_absent_client_succeeds_without_verification() {
    let dex = Arc::new(MockDex::new());
    let ctx = context(&dex);

    ClientResource
        .delete(
            &ctx,
            DeleteRequest {
                id: String::new(),
                state: ClientState {
                    inputs: web_app(),
                    created_at: None,
                },
            },
        )
        .await
        .unwrap();
    assert_eq!(dex.calls(), vec!["delete_client"]);
}

#[tokio::test]
async fn test_not_found_status_means_absent_on_delete() {
    let dex = Arc::new(MockDex::new().not_found_status());
    let ctx = context(&dex);

    ClientResource
        .delete(
            &ctx,
            DeleteRequest {
                id: "web-app".to_string(),
                state: ClientState::default(),
            },
        )
        .await
        .unwrap();
    assert_eq!(dex.calls(), vec!["delete_client"]);

    let err = ClientResource
        .update(
            &ctx,
            UpdateRequest {
                id: "web-app".to_string(),
                inputs: web_app(),
                state: ClientState {
                    inputs: web_app(),
                    created_at: None,
                },
                dry_run: false,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_without_any_id_is_rejected() {
    let dex = Arc::new(MockDex::new());
    let ctx = context(&dex);

    let err = ClientResource
        .delete(
            &ctx,
            DeleteRequest {
                id: String::new(),
                state: ClientState::default(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::MissingId { kind: "client" }));
    assert!(dex.calls().is_empty());
}

#[tokio::test]
async fn test_read_of_missing_client_is_none() {
    let dex = Arc::new(MockDex::new());
    let ctx = context(&dex);

    let read = ClientResource
        .read(
            &ctx,
            ReadRequest {
                id: "web-app".to_string(),
                state: None,
            },
        )
        .await
        .unwrap();
    assert!(read.is_none());
}

#[tokio::test]
async fn test_read_falls_back_to_list_without_get_client() {
    let dex = Arc::new(MockDex::new().get_client_unimplemented());
    let ctx = context(&dex);
    ClientResource.create(&ctx, create(web_app())).await.unwrap();
    dex.clear_calls();

    let read = ClientResource
        .read(
            &ctx,
            ReadRequest {
                id: "web-app".to_string(),
                state: Some(ClientState {
                    inputs: web_app(),
                    created_at: Some("2026-01-01T00:00:00Z".to_string()),
                }),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(read.inputs.name, "Web App");
    assert_eq!(
        read.state.created_at.as_deref(),
        Some("2026-01-01T00:00:00Z")
    );
    assert_eq!(dex.calls(), vec!["get_client", "list_clients"]);
}

#[tokio::test(start_paused = true)]
async fn test_unresponsive_dex_times_out() {
    let dex = Arc::new(MockDex::new().stall());
    let ctx = context(&dex);

    let err = ClientResource
        .create(&ctx, create(web_app()))
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    assert!(err.to_string().contains("web-app"));
}

#[tokio::test]
async fn test_errors_never_contain_the_secret() {
    let dex = Arc::new(MockDex::new().keep_after_delete());
    let ctx = context(&dex);
    let created = ClientResource
        .create(
            &ctx,
            create(ClientInputs {
                secret: Some(SecretString::new("do-not-print")),
                ..web_app()
            }),
        )
        .await
        .unwrap();

    let err = ClientResource
        .delete(
            &ctx,
            DeleteRequest {
                id: created.id,
                state: created.state.clone(),
            },
        )
        .await
        .unwrap_err();
    assert!(!err.to_string().contains("do-not-print"));
    assert!(!format!("{:?}", created.state).contains("do-not-print"));
}
