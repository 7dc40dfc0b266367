// Handle-based session host.
//
// `DecodeHost` is the flat boundary surface an embedder drives: allocate the
// two staging regions, create sessions, step them by handle, query their
// diagnostics and destroy them. It owns the regions on the embedder's behalf
// and a table of live sessions. Handles are never reused, so any call naming
// a destroyed session is rejected instead of reaching freed decoder state,
// and no step runs before both regions exist.

use std::collections::HashMap;
use std::fmt;

use crate::diagnostics::{ErrorCode, StepStatus};
use crate::region::{InputRegion, OutputRegion, RegionKind};
use crate::session::{DecodeSession, SessionError, SessionOptions};

/// Opaque handle to a session owned by a [`DecodeHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owner of the staging regions and of every session created through it.
#[derive(Debug, Default)]
pub struct DecodeHost {
    input: Option<InputRegion>,
    output: Option<OutputRegion>,
    sessions: HashMap<SessionId, DecodeSession>,
    next_id: u64,
    options: SessionOptions,
}

impl DecodeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions created by this host use `options`.
    pub fn with_options(options: SessionOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    // -- Regions ------------------------------------------------------------

    /// (Re)allocate the input region and return it for filling. Call
    /// [`set_input_len`](Self::set_input_len) or use
    /// [`stage_input`](Self::stage_input) to mark bytes valid.
    pub fn alloc_input(&mut self, len: usize) -> Result<&mut [u8], SessionError> {
        let region = self.input.get_or_insert_with(InputRegion::new);
        Ok(region.allocate(len)?)
    }

    /// (Re)allocate the output region.
    pub fn alloc_output(&mut self, len: usize) -> Result<&mut [u8], SessionError> {
        let region = self.output.get_or_insert_with(OutputRegion::new);
        Ok(region.allocate(len)?)
    }

    /// Copy `chunk` into the input region; returns the number of bytes staged.
    pub fn stage_input(&mut self, chunk: &[u8]) -> Result<usize, SessionError> {
        Ok(self.input_region_mut()?.stage(chunk))
    }

    /// Declare how many leading bytes of the input region are valid.
    pub fn set_input_len(&mut self, len: usize) -> Result<(), SessionError> {
        Ok(self.input_region_mut()?.set_len(len)?)
    }

    pub fn input_region(&self) -> Result<&InputRegion, SessionError> {
        self.input
            .as_ref()
            .ok_or(SessionError::RegionNotAllocated(RegionKind::Input))
    }

    pub fn input_region_mut(&mut self) -> Result<&mut InputRegion, SessionError> {
        self.input
            .as_mut()
            .ok_or(SessionError::RegionNotAllocated(RegionKind::Input))
    }

    pub fn output_region(&self) -> Result<&OutputRegion, SessionError> {
        self.output
            .as_ref()
            .ok_or(SessionError::RegionNotAllocated(RegionKind::Output))
    }

    /// Take the bytes the last step wrote into the output region.
    pub fn drain_output(&mut self) -> Result<&[u8], SessionError> {
        let region = self
            .output
            .as_mut()
            .ok_or(SessionError::RegionNotAllocated(RegionKind::Output))?;
        Ok(region.drain())
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Create a session ready for its first step.
    pub fn create_session(&mut self) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        self.sessions
            .insert(id, DecodeSession::with_options(self.options));
        log::debug!("session {id} created ({} live)", self.sessions.len());
        id
    }

    /// Destroy a session. Destroying it again is rejected.
    pub fn destroy(&mut self, id: SessionId) -> Result<(), SessionError> {
        let session = self
            .sessions
            .remove(&id)
            .ok_or(SessionError::UnknownSession(id.0))?;
        session.destroy();
        Ok(())
    }

    pub fn live_sessions(&self) -> usize {
        self.sessions.len()
    }

    // -- Stepping -----------------------------------------------------------

    /// Step session `id` over `[offset, offset + len)` of the input region,
    /// writing into the output region. Returns the step status; details are
    /// available through the query methods.
    pub fn step(
        &mut self,
        id: SessionId,
        offset: usize,
        len: usize,
    ) -> Result<StepStatus, SessionError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::UnknownSession(id.0))?;
        let input = self
            .input
            .as_ref()
            .ok_or(SessionError::RegionNotAllocated(RegionKind::Input))?;
        let output = self
            .output
            .as_mut()
            .ok_or(SessionError::RegionNotAllocated(RegionKind::Output))?;
        Ok(session.step(input, offset, len, output)?.status)
    }

    /// Like [`step`](Self::step), returning the numeric status code.
    pub fn step_code(
        &mut self,
        id: SessionId,
        offset: usize,
        len: usize,
    ) -> Result<i32, SessionError> {
        self.step(id, offset, len).map(StepStatus::code)
    }

    // -- Queries ------------------------------------------------------------

    pub fn session(&self, id: SessionId) -> Result<&DecodeSession, SessionError> {
        self.sessions
            .get(&id)
            .ok_or(SessionError::UnknownSession(id.0))
    }

    pub fn has_more_output(&self, id: SessionId) -> Result<bool, SessionError> {
        Ok(self.session(id)?.has_buffered_output())
    }

    pub fn consumed_input(&self, id: SessionId) -> Result<usize, SessionError> {
        Ok(self.session(id)?.consumed_input())
    }

    pub fn produced_output(&self, id: SessionId) -> Result<usize, SessionError> {
        Ok(self.session(id)?.produced_output())
    }

    /// Unconsumed bytes of the range handed to the last step.
    pub fn available_input(&self, id: SessionId) -> Result<usize, SessionError> {
        Ok(self.session(id)?.available_input())
    }

    /// Unused output capacity after the last step.
    pub fn available_output(&self, id: SessionId) -> Result<usize, SessionError> {
        let produced = self.session(id)?.produced_output();
        Ok(self.output_region()?.capacity().saturating_sub(produced))
    }

    pub fn error_code(&self, id: SessionId) -> Result<ErrorCode, SessionError> {
        Ok(self.session(id)?.error_code())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
