//! Auxiliary authorisation table
//!
//! Lets participants outside the built-in check set (a companion computer,
//! a script) take part in the arm decision asynchronously. Each participant
//! acquires a slot, then reports pass or fail whenever it is ready; the
//! pre-arm evaluation blocks until every acquired slot has passed.
//!
//! All mutation happens under one critical-section mutex, so writers may
//! run on any execution context. Nothing is logged while the lock is held.

use alloc::string::String;
use core::cell::RefCell;
use core::fmt;

use critical_section::Mutex;

use super::status::{format_truncated, FailureText};

/// Maximum number of authorisers per arming attempt
pub const AUX_AUTH_MAX_SLOTS: usize = 3;

/// Capacity of the shared failure message buffer (characters)
pub const AUX_AUTH_MSG_LEN: usize = 42;

const MSG_REFUSED: &str = "Auxiliary authorisation refused";
const MSG_WAITING: &str = "Waiting for auxiliary authorisation";
const MSG_TOO_MANY: &str = "Too many auxiliary authorisers";
const MSG_NO_MEMORY: &str = "memory low for auxiliary authorisation";

/// Handle to an acquired slot.
///
/// Ids are handed out from 0 upwards and never reused until the table is
/// reset. A stale id (from before a reset) is silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(u8);

impl SlotId {
    /// Rebuild an id received from an external protocol message
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Response state of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthResponse {
    #[default]
    NoResponse,
    Passed,
    Failed,
}

/// Slot allocation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxAuthError {
    /// Every slot is already taken
    CapacityExceeded,
    /// The shared failure message buffer could not be allocated
    OutOfMemory,
}

impl fmt::Display for AuxAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuxAuthError::CapacityExceeded => write!(f, "{}", MSG_TOO_MANY),
            AuxAuthError::OutOfMemory => write!(f, "{}", MSG_NO_MEMORY),
        }
    }
}

impl core::error::Error for AuxAuthError {}

/// Outcome of evaluating the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuxAuthStatus {
    /// No slots, or every slot passed
    Authorised,
    /// At least one slot has not responded and none failed
    Waiting,
    /// At least one slot failed; carries the displayed reason
    Refused(FailureText),
    /// A slot allocation failed since the last reset
    AllocationFailed(AuxAuthError),
}

impl AuxAuthStatus {
    pub fn is_authorised(&self) -> bool {
        matches!(self, AuxAuthStatus::Authorised)
    }

    /// Operator-facing reason for a blocked state
    pub fn message(&self) -> &str {
        match self {
            AuxAuthStatus::Authorised => "",
            AuxAuthStatus::Waiting => MSG_WAITING,
            AuxAuthStatus::Refused(reason) => reason.as_str(),
            AuxAuthStatus::AllocationFailed(AuxAuthError::CapacityExceeded) => MSG_TOO_MANY,
            AuxAuthStatus::AllocationFailed(AuxAuthError::OutOfMemory) => MSG_NO_MEMORY,
        }
    }
}

struct TableInner {
    count: u8,
    error: Option<AuxAuthError>,
    states: [AuthResponse; AUX_AUTH_MAX_SLOTS],
    fail_msg: Option<String>,
    fail_msg_source: Option<SlotId>,
}

impl TableInner {
    const fn new() -> Self {
        Self {
            count: 0,
            error: None,
            states: [AuthResponse::NoResponse; AUX_AUTH_MAX_SLOTS],
            fail_msg: None,
            fail_msg_source: None,
        }
    }

    fn valid(&self, slot: SlotId) -> bool {
        slot.raw() < self.count
    }
}

/// Table of external authoriser slots.
///
/// Shared between the arming system (reader, resets it) and any number of
/// authorisers (writers holding only a [`SlotId`]).
pub struct AuxAuthTable {
    max_slots: u8,
    msg_capacity: usize,
    inner: Mutex<RefCell<TableInner>>,
}

impl AuxAuthTable {
    pub const fn new() -> Self {
        Self::with_limits(AUX_AUTH_MAX_SLOTS, AUX_AUTH_MSG_LEN)
    }

    /// Table with a reduced slot count and a custom message buffer size.
    ///
    /// `max_slots` is clamped to [`AUX_AUTH_MAX_SLOTS`].
    pub const fn with_limits(max_slots: usize, msg_capacity: usize) -> Self {
        let max_slots = if max_slots > AUX_AUTH_MAX_SLOTS {
            AUX_AUTH_MAX_SLOTS
        } else {
            max_slots
        };
        Self {
            max_slots: max_slots as u8,
            msg_capacity,
            inner: Mutex::new(RefCell::new(TableInner::new())),
        }
    }

    /// Reserve a slot for a new authoriser.
    ///
    /// Any failure latches a table-wide error that blocks arming until
    /// [`reset`](Self::reset).
    pub fn acquire_slot(&self) -> Result<SlotId, AuxAuthError> {
        let result = critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);

            if inner.count >= self.max_slots {
                inner.error.get_or_insert(AuxAuthError::CapacityExceeded);
                return Err(AuxAuthError::CapacityExceeded);
            }

            if inner.fail_msg.is_none() {
                let mut buffer = String::new();
                if buffer.try_reserve_exact(self.msg_capacity).is_err() {
                    inner.error.get_or_insert(AuxAuthError::OutOfMemory);
                    return Err(AuxAuthError::OutOfMemory);
                }
                inner.fail_msg = Some(buffer);
            }

            let slot = SlotId(inner.count);
            inner.count += 1;
            Ok(slot)
        });

        match result {
            Ok(slot) => crate::log_debug!("Aux auth slot {} acquired", slot.raw()),
            Err(e) => crate::log_warn!("Aux auth slot refused: {}", e),
        }
        result
    }

    /// Record a pass. Unknown or stale ids are ignored.
    pub fn report_passed(&self, slot: SlotId) {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            if inner.valid(slot) {
                inner.states[slot.index()] = AuthResponse::Passed;
            }
        });
    }

    /// Record a refusal with an optional reason. Unknown or stale ids are
    /// ignored.
    ///
    /// The displayed reason belongs to the lowest-id failed slot: the
    /// message buffer is only written when no lower slot has failed.
    pub fn report_failed(&self, slot: SlotId, reason: Option<&str>) {
        critical_section::with(|cs| {
            let mut guard = self.inner.borrow_ref_mut(cs);
            let inner = &mut *guard;
            if !inner.valid(slot) {
                return;
            }
            inner.states[slot.index()] = AuthResponse::Failed;

            if inner.states[..slot.index()].contains(&AuthResponse::Failed) {
                return;
            }

            let capacity = self.msg_capacity;
            let text = reason.unwrap_or(MSG_REFUSED);
            if let Some(buffer) = inner.fail_msg.as_mut() {
                buffer.clear();
                let mut end = text.len().min(capacity);
                while !text.is_char_boundary(end) {
                    end -= 1;
                }
                buffer.push_str(&text[..end]);
                inner.fail_msg_source = Some(slot);
            }
        });
    }

    /// Current aggregate outcome.
    ///
    /// Any failed slot refuses (showing its reason if it owns the message
    /// buffer); otherwise any silent slot keeps the table waiting.
    pub fn evaluate(&self) -> AuxAuthStatus {
        critical_section::with(|cs| {
            let inner = self.inner.borrow_ref(cs);

            if let Some(error) = inner.error {
                return AuxAuthStatus::AllocationFailed(error);
            }

            let mut refused: Option<FailureText> = None;
            let mut waiting = false;
            for (i, state) in inner.states[..inner.count as usize].iter().enumerate() {
                match state {
                    AuthResponse::NoResponse => waiting = true,
                    AuthResponse::Failed => {
                        let owns_message = inner.fail_msg_source == Some(SlotId(i as u8));
                        match (&inner.fail_msg, owns_message) {
                            (Some(msg), true) => {
                                refused = Some(format_truncated(format_args!("{}", msg)));
                            }
                            _ if refused.is_none() => {
                                refused = Some(format_truncated(format_args!("{}", MSG_REFUSED)));
                            }
                            _ => {}
                        }
                    }
                    AuthResponse::Passed => {}
                }
            }

            match refused {
                Some(reason) => AuxAuthStatus::Refused(reason),
                None if waiting => AuxAuthStatus::Waiting,
                None => AuxAuthStatus::Authorised,
            }
        })
    }

    /// Clear every slot, the error latch and the message buffer.
    ///
    /// Responses reported before the reset are invisible afterwards.
    pub fn reset(&self) {
        let released = critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            let released = inner.count;
            *inner = TableInner::new();
            released
        });
        if released > 0 {
            crate::log_debug!("Aux auth table reset ({} slots released)", released);
        }
    }

    /// Slots handed out since the last reset
    pub fn slot_count(&self) -> u8 {
        critical_section::with(|cs| self.inner.borrow_ref(cs).count)
    }

    /// Response recorded for `slot`, if it is currently valid
    pub fn response(&self, slot: SlotId) -> Option<AuthResponse> {
        critical_section::with(|cs| {
            let inner = self.inner.borrow_ref(cs);
            inner.valid(slot).then(|| inner.states[slot.index()])
        })
    }
}

impl Default for AuxAuthTable {
    fn default() -> Self {
        Self::new()
    }
}
