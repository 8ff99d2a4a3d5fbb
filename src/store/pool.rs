//! SQLite connection pool
//!
//! Fixed-size checkout/checkin pool. The observed prototype shared one
//! process-wide connection; here every caller checks a connection out for
//! the duration of one query and the guard returns it on drop. Checkout
//! waits up to a bounded timeout before failing with a storage error.

use crate::errors::{LexError, Result};
use rusqlite::Connection;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Default wait for a free connection before giving up
const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct PoolInner {
    idle: Mutex<Vec<Connection>>,
    available: Condvar,
    checkout_timeout: Duration,
}

/// Fixed-size pool of SQLite connections
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    /// Build a pool from pre-opened connections
    pub fn new(connections: Vec<Connection>) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(connections),
                available: Condvar::new(),
                checkout_timeout: DEFAULT_CHECKOUT_TIMEOUT,
            }),
        }
    }

    /// Build a pool with a custom checkout timeout
    pub fn with_timeout(connections: Vec<Connection>, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(connections),
                available: Condvar::new(),
                checkout_timeout: timeout,
            }),
        }
    }

    /// Check a connection out of the pool, waiting up to the pool timeout
    pub fn checkout(&self) -> Result<PooledConnection> {
        let mut idle = self
            .inner
            .idle
            .lock()
            .map_err(|_| LexError::Storage("connection pool lock poisoned".to_string()))?;

        let deadline = std::time::Instant::now() + self.inner.checkout_timeout;
        while idle.is_empty() {
            let now = std::time::Instant::now();
            if now >= deadline {
                return Err(LexError::Storage(
                    "timed out waiting for a storage connection".to_string(),
                ));
            }
            let (guard, wait) = self
                .inner
                .available
                .wait_timeout(idle, deadline - now)
                .map_err(|_| LexError::Storage("connection pool lock poisoned".to_string()))?;
            idle = guard;
            if wait.timed_out() && idle.is_empty() {
                return Err(LexError::Storage(
                    "timed out waiting for a storage connection".to_string(),
                ));
            }
        }

        let conn = idle.pop().expect("non-empty after wait");
        Ok(PooledConnection {
            conn: Some(conn),
            pool: Arc::clone(&self.inner),
        })
    }

    /// Number of currently idle connections
    pub fn idle_count(&self) -> usize {
        self.inner.idle.lock().map(|v| v.len()).unwrap_or(0)
    }
}

/// Guard holding a checked-out connection; returns it to the pool on drop
#[derive(Debug)]
pub struct PooledConnection {
    conn: Option<Connection>,
    pool: Arc<PoolInner>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn.as_ref().expect("connection present until drop")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn.as_mut().expect("connection present until drop")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Ok(mut idle) = self.pool.idle.lock() {
                idle.push(conn);
                self.pool.available.notify_one();
            }
        }
    }
}
