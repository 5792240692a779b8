use core::fmt;
use std::ops::Deref;
use std::ops::DerefMut;
use std::time::Duration;

use tokio::time::Instant;

/// Stores an object along with its last update time and lease duration.
///
/// The lease duration specifies how long the object remains valid. The
/// persisted vote of a node is kept in a `Leased`: it is touched whenever the
/// node hears from a legitimate leader or grants a vote, and an expired lease
/// means the election timeout has elapsed.
#[derive(Debug, Clone)]
#[derive(PartialEq, Eq)]
pub(crate) struct Leased<T> {
    data: T,
    last_modified: Option<Instant>,
    lease: Duration,
}

impl<T: fmt::Display> fmt::Display for Leased<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last_modified {
            Some(utime) => write!(
                f,
                "{}@{:?}ago+{:?}",
                self.data,
                utime.elapsed(),
                self.lease
            ),
            None => write!(f, "{}", self.data),
        }
    }
}

impl<T: Default> Default for Leased<T> {
    fn default() -> Self {
        Self {
            data: T::default(),
            last_modified: None,
            lease: Duration::default(),
        }
    }
}

impl<T> Deref for Leased<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for Leased<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl<T> Leased<T> {
    /// Creates a new object that keeps track of the time when it was last
    /// updated.
    pub(crate) fn new(now: Instant, lease: Duration, data: T) -> Self {
        Self {
            data,
            last_modified: Some(now),
            lease,
        }
    }

    /// Return a Display instance that shows the last updated time and lease
    /// duration relative to `now`.
    pub(crate) fn display_lease_info(
        &self,
        now: Instant,
    ) -> impl fmt::Display + '_ {
        struct DisplayLeaseInfo<'a, T> {
            now: Instant,
            leased: &'a Leased<T>,
        }

        impl<T> fmt::Display for DisplayLeaseInfo<'_, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match &self.leased.last_modified {
                    Some(utime) => {
                        let expire_at = *utime + self.leased.lease;
                        write!(
                            f,
                            "last_update: {:?} ago, lease: {:?}, expire in: {:?}",
                            self.now.saturating_duration_since(*utime),
                            self.leased.lease,
                            expire_at.saturating_duration_since(self.now)
                        )
                    }
                    None => write!(f, "last_update: None"),
                }
            }
        }

        DisplayLeaseInfo { now, leased: self }
    }

    /// Update the content of the object and the last updated time.
    pub(crate) fn update(&mut self, now: Instant, lease: Duration, data: T) {
        self.data = data;
        self.last_modified = Some(now);
        self.lease = lease;
    }

    /// Checks if the value is expired based on the provided `now` timestamp.
    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        match self.last_modified {
            Some(utime) => now > utime + self.lease,
            None => true,
        }
    }

    /// Update the last updated time and the lease duration.
    pub(crate) fn touch(&mut self, now: Instant, lease: Duration) {
        self.last_modified = Some(now);
        self.lease = lease;
    }
}
