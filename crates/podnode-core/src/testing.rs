//! Test doubles: a scripted storage node and a raw HTTP responder.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use podnode_ipfs::{
    AddedEntry, ContentAddress, IpfsError, IpfsResult, LinkListing, ListedLink, ListedObject,
    PeerDescriptor, RepoStats, StorageNode,
};
use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Storage node that answers from fixed tables and records every call.
#[derive(Default)]
pub(crate) struct FakeNode {
    pub(crate) store_entries: Vec<AddedEntry>,
    pub(crate) listings: HashMap<String, LinkListing>,
    pub(crate) cat_content: HashMap<String, Vec<u8>>,
    pub(crate) pin_confirmation: Option<ContentAddress>,
    pub(crate) fail_pin: bool,
    pub(crate) repo_size: u64,
    pub(crate) calls: Mutex<Vec<String>>,
}

impl FakeNode {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

pub(crate) fn entry(name: &str, hash: &str) -> AddedEntry {
    AddedEntry {
        name: name.to_string(),
        hash: ContentAddress::from(hash),
    }
}

pub(crate) fn listing(links: &[(&str, u64)]) -> LinkListing {
    LinkListing {
        objects: vec![ListedObject {
            hash: String::new(),
            links: links
                .iter()
                .map(|(hash, size)| ListedLink {
                    name: String::new(),
                    hash: ContentAddress::from(*hash),
                    size: *size,
                })
                .collect(),
        }],
    }
}

#[async_trait]
impl StorageNode for FakeNode {
    async fn store(&self, name: &str, bytes: Vec<u8>) -> IpfsResult<Vec<AddedEntry>> {
        self.record(format!("store:{name}:{}", bytes.len()));
        Ok(self.store_entries.clone())
    }

    async fn list_links(&self, address: &ContentAddress) -> IpfsResult<LinkListing> {
        self.record(format!("ls:{address}"));
        Ok(self
            .listings
            .get(address.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn cat(&self, path: &str) -> Option<Vec<u8>> {
        self.record(format!("cat:{path}"));
        self.cat_content.get(path).cloned()
    }

    async fn pin(&self, address: &ContentAddress) -> IpfsResult<ContentAddress> {
        self.record(format!("pin:{address}"));
        if self.fail_pin {
            return Err(IpfsError::Status {
                method: "pin/add",
                status: StatusCode::BAD_GATEWAY,
                body: String::new(),
            });
        }
        Ok(self
            .pin_confirmation
            .clone()
            .unwrap_or_else(|| address.clone()))
    }

    async fn unpin(&self, address: &ContentAddress) -> IpfsResult<ContentAddress> {
        self.record(format!("unpin:{address}"));
        Ok(address.clone())
    }

    async fn identity(&self) -> IpfsResult<String> {
        Ok("12D3KooWFake".to_string())
    }

    async fn agent_version(&self) -> IpfsResult<String> {
        Ok("0.29.0".to_string())
    }

    async fn peers(&self) -> IpfsResult<Vec<PeerDescriptor>> {
        Ok(Vec::new())
    }

    async fn repo_stats(&self) -> IpfsResult<RepoStats> {
        self.record("repo_stats".to_string());
        Ok(RepoStats {
            repo_size: self.repo_size,
        })
    }
}

/// Raw HTTP server that answers each new connection with the next scripted
/// response, then closes it.
pub(crate) struct ScriptedServer {
    pub(crate) url: String,
    pub(crate) hits: Arc<AtomicUsize>,
}

pub(crate) async fn scripted_server(responses: Vec<Vec<u8>>) -> ScriptedServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind scripted server");
    let addr = listener.local_addr().expect("scripted server address");
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    tokio::spawn(async move {
        for response in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            read_request_head(&mut socket).await;
            let _ = socket.write_all(&response).await;
            let _ = socket.shutdown().await;
        }
    });

    ScriptedServer {
        url: format!("http://{addr}/episode.mp3"),
        hits,
    }
}

/// `200 OK` declaring `declared` bytes of content but carrying `body`.
pub(crate) fn http_response(declared: usize, body: &[u8]) -> Vec<u8> {
    http_status_response("200 OK", declared, body)
}

/// Response with an arbitrary status line, e.g. `404 Not Found`.
pub(crate) fn http_status_response(status: &str, declared: usize, body: &[u8]) -> Vec<u8> {
    let mut response = format!(
        "HTTP/1.1 {status}\r\nContent-Length: {declared}\r\nConnection: close\r\n\r\n"
    )
    .into_bytes();
    response.extend_from_slice(body);
    response
}

async fn read_request_head(socket: &mut TcpStream) {
    let mut head = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(read) => {
                head.extend_from_slice(&chunk[..read]);
                if head.windows(4).any(|window| window == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
}
