use super::ImportError;

/// Handle for one in-flight import. Only the current ticket may finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportTicket(u64);

/// Tracks the single import allowed in flight at a time.
#[derive(Debug, Default)]
pub struct ImportSession {
    generation: u64,
    in_flight: Option<u64>,
}

impl ImportSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_importing(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn begin(&mut self) -> Result<ImportTicket, ImportError> {
        if self.in_flight.is_some() {
            return Err(ImportError::Busy);
        }
        self.generation += 1;
        self.in_flight = Some(self.generation);
        Ok(ImportTicket(self.generation))
    }

    /// Abandons the in-flight import. Its eventual result is discarded.
    pub fn dismiss(&mut self) -> bool {
        self.in_flight.take().is_some()
    }

    /// Ends the import. Returns `false` when the ticket was dismissed, in
    /// which case the caller must drop the result.
    pub fn finish(&mut self, ticket: ImportTicket) -> bool {
        if self.in_flight == Some(ticket.0) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }
}
