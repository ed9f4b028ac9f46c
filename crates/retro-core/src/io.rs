//! The 256-slot I/O port bus.

/// Dispatches `IN`/`OUT` to per-port device callbacks.
///
/// Unassigned input ports read back `0xFF`; unassigned output ports discard
/// the value, matching an open/floating data bus.
pub struct PortBus {
    inputs: Vec<Option<Box<dyn FnMut(u8) -> u8 + Send>>>,
    outputs: Vec<Option<Box<dyn FnMut(u8, u8) + Send>>>,
    /// Ticks when the same port is read back-to-back without an intervening
    /// write or a different port access; the scheduler consults this to
    /// decide whether a tight status-poll loop should yield.
    busy_loop: u32,
    last_input_port: Option<u8>,
}

impl PortBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inputs: (0..256).map(|_| None).collect(),
            outputs: (0..256).map(|_| None).collect(),
            busy_loop: 0,
            last_input_port: None,
        }
    }

    pub fn connect_input(&mut self, port: u8, handler: impl FnMut(u8) -> u8 + Send + 'static) {
        self.inputs[port as usize] = Some(Box::new(handler));
    }

    pub fn connect_output(&mut self, port: u8, handler: impl FnMut(u8, u8) + Send + 'static) {
        self.outputs[port as usize] = Some(Box::new(handler));
    }

    /// Read a port with no side effect on the busy-loop counter.
    pub fn input(&mut self, port: u8) -> u8 {
        match &mut self.inputs[port as usize] {
            Some(handler) => handler(port),
            None => 0xFF,
        }
    }

    /// Read a port, tracking repeated reads of the same port for throttling.
    pub fn input_busy(&mut self, port: u8) -> u8 {
        if self.last_input_port == Some(port) {
            self.busy_loop += 1;
        } else {
            self.busy_loop = 0;
            self.last_input_port = Some(port);
        }
        self.input(port)
    }

    pub fn output(&mut self, port: u8, value: u8) {
        self.last_input_port = None;
        match &mut self.outputs[port as usize] {
            Some(handler) => handler(port, value),
            None => {}
        }
    }

    #[must_use]
    pub fn busy_loop_count(&self) -> u32 {
        self.busy_loop
    }
}

impl Default for PortBus {
    fn default() -> Self {
        Self::new()
    }
}
