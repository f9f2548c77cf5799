//! The decision layer shared by every store.
//!
//! A store receives an event, updates the state it owns, and names at most
//! one piece of IO to perform. It never performs that IO itself.
//!
//! - **State is owned**: `decide` takes `&mut self`; nothing else writes the state
//! - **Synchronous**: no `.await` inside a decision
//! - **At most one command** per event
//! - **Outcomes are events**: an effect runs the command and dispatches its
//!   result back to the store that asked for it

/// A state machine that interprets events and decides on commands.
///
/// Every store in this crate (catalog, wizard, session) is a machine. The
/// [`App`](crate::App) routes events to them in dispatch order and hands the
/// returned command to an effect.
///
/// # Example
///
/// ```
/// use estatevue::Machine;
///
/// struct Counter {
///     count: i32,
/// }
///
/// enum CounterEvent {
///     Increment,
///     Reset,
/// }
///
/// #[derive(Debug, PartialEq)]
/// enum CounterCommand {
///     Announce(i32),
/// }
///
/// impl Machine for Counter {
///     type Event = CounterEvent;
///     type Command = CounterCommand;
///
///     fn decide(&mut self, event: CounterEvent) -> Option<CounterCommand> {
///         match event {
///             CounterEvent::Increment => {
///                 self.count += 1;
///                 None
///             }
///             CounterEvent::Reset => {
///                 let last = self.count;
///                 self.count = 0;
///                 Some(CounterCommand::Announce(last))
///             }
///         }
///     }
/// }
///
/// let mut counter = Counter { count: 0 };
/// counter.decide(CounterEvent::Increment);
/// assert_eq!(counter.decide(CounterEvent::Reset), Some(CounterCommand::Announce(1)));
/// ```
pub trait Machine {
    /// The event type this machine handles.
    type Event;

    /// The command type this machine can emit.
    type Command;

    /// Process an event and optionally return a command.
    ///
    /// # Guarantees
    ///
    /// - Called synchronously (no async)
    /// - Called serially, in dispatch order
    /// - At most one command per event
    /// - Never fails: unexpected events are ignored
    fn decide(&mut self, event: Self::Event) -> Option<Self::Command>;
}
