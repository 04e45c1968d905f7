//! LinkedDb - an ordered key-value facade over a sorted storage engine.
//!
//! LinkedDb stores values in a sorted engine and presents them as a list:
//! the head is the entry with the smallest key and iteration walks keys in
//! ascending byte order. It reads stores written by the older linked-list
//! layout, which kept explicit next/previous pointers in every record and a
//! head pointer under a reserved key. Those pointers are no longer written
//! or followed; order comes from the engine alone.
//!
//! # Storage Layout
//!
//! ```text
//! Node key:    | 0x00 | user_key (bytes) |
//! Legacy head: | 0x01 |                      (never written, skipped on read)
//! Node value:  | version u16 | value | has_next | next | has_previous | previous |
//! ```
//!
//! # Key Concepts
//!
//! - **LinkedDb**: The main entry point providing both read and write operations.
//! - **LinkedDbReader**: A read-only view, either live or over a snapshot.
//! - **LinkedRead**: Trait defining read operations shared by both types.
//! - **LinkedIterator**: Ascending iteration that stops at the end of the
//!   node namespace.
//!
//! # Example
//!
//! ```ignore
//! use linkeddb::{Config, LinkedDb, LinkedRead};
//! use bytes::Bytes;
//!
//! let db = LinkedDb::open(Config::default()).await?;
//!
//! db.put(Bytes::from("job:2"), Bytes::from("render")).await?;
//! db.put(Bytes::from("job:1"), Bytes::from("fetch")).await?;
//!
//! let head = db.head().await?;
//! assert_eq!(head.key, Bytes::from("job:1"));
//!
//! let mut iter = db.iter_from(Bytes::from("job:2")).await?;
//! while let Some(entry) = iter.next().await? {
//!     println!("{:?}: {:?}", entry.key, entry.value);
//! }
//!
//! db.delete(Bytes::from("job:1")).await?;
//! ```

mod config;
mod error;
mod linkeddb;
mod model;
mod reader;
mod serde;
mod storage;

pub use config::{Config, WriteOptions};
pub use error::{Error, Result};
pub use linkeddb::LinkedDb;
pub use model::LinkedEntry;
pub use reader::{LinkedDbReader, LinkedIterator, LinkedRead};
pub use serde::{HEAD_KEY, NODE_KEY_PREFIX};
