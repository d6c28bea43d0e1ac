//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod command_sink;
pub mod event_bus;
pub mod generator;
pub mod history;
pub mod schedule_repo;
pub mod store;

pub use command_sink::ActuatorCommandSink;
pub use event_bus::EventPublisher;
pub use generator::ScheduleGenerator;
pub use history::SensorHistoryRepository;
pub use schedule_repo::ScheduleRepository;
pub use store::GreenhouseStore;
