//! ChEMBL client against a canned local HTTP server, plus one live check.
//!
//! The live test needs network access. Run with:
//! ```bash
//! cargo test --package nocisift-ingestion --test test_chembl_client -- --ignored --nocapture
//! ```

use std::time::Duration;

use nocisift_ingestion::{BioactivitySource, ChemblClient, ChemblSettings, RetrievalError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve each canned `(status line, body)` to one connection, in order.
/// Returns the base URL to point the client at.
async fn serve(responses: Vec<(&'static str, String)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        for (status, body) in responses {
            let Ok((mut socket, _)) = listener.accept().await else { return };
            let mut buf = vec![0u8; 8192];
            let mut read = 0;
            while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf[read..]).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => read += n,
                }
            }
            let reply = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{addr}/chembl/api/data")
}

fn client(base_url: String) -> ChemblClient {
    ChemblClient::with_settings(ChemblSettings {
        base_url,
        timeout: Duration::from_secs(5),
        page_size: 2,
        ..ChemblSettings::default()
    })
    .unwrap()
}

fn row(id: &str, smiles: &str, value: &str) -> String {
    format!(
        r#"{{"molecule_chembl_id":"{id}","canonical_smiles":"{smiles}","standard_value":"{value}","standard_type":"IC50"}}"#
    )
}

#[tokio::test]
async fn test_follows_pagination_until_limit() {
    let page1 = format!(
        r#"{{"activities":[{},{}],"page_meta":{{"next":"/chembl/api/data/activity.json?limit=2&offset=2"}}}}"#,
        row("CHEMBL1", "CCO", "10"),
        row("CHEMBL2", "CCN", "20"),
    );
    let page2 = format!(
        r#"{{"activities":[{},{}],"page_meta":{{"next":"/chembl/api/data/activity.json?limit=2&offset=4"}}}}"#,
        row("CHEMBL3", "CCC", "30"),
        row("CHEMBL4", "CCCl", "40"),
    );
    let base = serve(vec![("200 OK", page1), ("200 OK", page2)]).await;

    let records = client(base).fetch_bioactivities("CHEMBL230", 1000.0, 3).await.unwrap();
    let ids: Vec<_> = records.iter().map(|r| r.compound_id.as_str()).collect();
    assert_eq!(ids, ["CHEMBL1", "CHEMBL2", "CHEMBL3"]);
}

#[tokio::test]
async fn test_rate_limit_is_reported() {
    let base = serve(vec![("429 Too Many Requests", "{}".to_string())]).await;
    let err = client(base).fetch_bioactivities("CHEMBL230", 1000.0, 10).await.unwrap_err();
    assert!(matches!(err, RetrievalError::RateLimited), "got {err:?}");
}

#[tokio::test]
async fn test_server_error_and_garbage_body() {
    let base = serve(vec![("503 Service Unavailable", "{}".to_string())]).await;
    let err = client(base).fetch_bioactivities("CHEMBL230", 1000.0, 10).await.unwrap_err();
    assert!(matches!(err, RetrievalError::Http { status: 503, .. }), "got {err:?}");

    let base = serve(vec![("200 OK", "<html>maintenance</html>".to_string())]).await;
    let err = client(base).fetch_bioactivities("CHEMBL230", 1000.0, 10).await.unwrap_err();
    assert!(matches!(err, RetrievalError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
#[ignore] // Requires network access to www.ebi.ac.uk
async fn test_live_cox2_ic50() {
    let client = ChemblClient::new().unwrap();
    let records = client.fetch_bioactivities("CHEMBL230", 1000.0, 20).await.unwrap();
    println!("Retrieved {} COX-2 records", records.len());
    assert!(!records.is_empty());
    assert!(records.iter().all(|r| r.potency_nm <= 1000.0));
}
