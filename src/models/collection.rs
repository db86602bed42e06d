//! Collection model structures
//!
//! A collection is a tree of folders and requests. Folders nest to arbitrary
//! depth; item order mirrors the order in which the source document
//! enumerates its resources or operations.

use super::new_uid;
use super::request::Request;
use serde::{Deserialize, Serialize};

/// Version stamped on every produced collection
pub const COLLECTION_VERSION: &str = "1";

/// Top-level collection envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub uid: String,
    pub name: String,
    pub version: String,
    pub items: Vec<Item>,
    pub environments: Vec<serde_json::Value>,
}

impl Collection {
    /// Wrap an item tree with a fresh uid, the current version and no environments
    pub fn new(name: impl Into<String>, items: Vec<Item>) -> Self {
        Collection {
            uid: new_uid(),
            name: name.into(),
            version: COLLECTION_VERSION.to_string(),
            items,
            environments: Vec::new(),
        }
    }

    /// Every uid in the collection: the collection itself, each item, and the
    /// headers, params, vars and form fields of each request.
    pub fn uids(&self) -> Vec<&str> {
        let mut uids = vec![self.uid.as_str()];
        for item in &self.items {
            item.collect_uids(&mut uids);
        }
        uids
    }

    /// All requests in depth-first order
    pub fn requests(&self) -> Vec<&RequestItem> {
        let mut requests = Vec::new();
        for item in &self.items {
            item.collect_requests(&mut requests);
        }
        requests
    }
}

/// A node of the collection tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Item {
    #[serde(rename = "folder")]
    Folder(FolderItem),
    #[serde(rename = "http-request")]
    Request(RequestItem),
}

impl Item {
    pub fn uid(&self) -> &str {
        match self {
            Item::Folder(folder) => &folder.uid,
            Item::Request(request) => &request.uid,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Item::Folder(folder) => &folder.name,
            Item::Request(request) => &request.name,
        }
    }

    pub fn as_folder(&self) -> Option<&FolderItem> {
        match self {
            Item::Folder(folder) => Some(folder),
            Item::Request(_) => None,
        }
    }

    pub fn as_request(&self) -> Option<&RequestItem> {
        match self {
            Item::Request(request) => Some(request),
            Item::Folder(_) => None,
        }
    }

    fn collect_uids<'a>(&'a self, uids: &mut Vec<&'a str>) {
        match self {
            Item::Folder(folder) => {
                uids.push(&folder.uid);
                for child in &folder.items {
                    child.collect_uids(uids);
                }
            }
            Item::Request(item) => {
                uids.push(&item.uid);
                let request = &item.request;
                uids.extend(request.headers.iter().map(|f| f.uid.as_str()));
                uids.extend(request.params.iter().map(|f| f.uid.as_str()));
                uids.extend(request.vars.req.iter().map(|v| v.uid.as_str()));
                uids.extend(request.body.form_fields().map(|f| f.uid.as_str()));
            }
        }
    }

    fn collect_requests<'a>(&'a self, requests: &mut Vec<&'a RequestItem>) {
        match self {
            Item::Folder(folder) => {
                for child in &folder.items {
                    child.collect_requests(requests);
                }
            }
            Item::Request(item) => requests.push(item),
        }
    }
}

/// A folder grouping requests and nested folders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderItem {
    pub uid: String,
    pub name: String,
    pub items: Vec<Item>,
}

impl FolderItem {
    pub fn new(name: impl Into<String>, items: Vec<Item>) -> Self {
        FolderItem {
            uid: new_uid(),
            name: name.into(),
            items,
        }
    }
}

/// A single HTTP request in the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestItem {
    pub uid: String,
    pub name: String,
    pub request: Request,
}

impl RequestItem {
    pub fn new(name: impl Into<String>, request: Request) -> Self {
        RequestItem {
            uid: new_uid(),
            name: name.into(),
            request,
        }
    }
}
