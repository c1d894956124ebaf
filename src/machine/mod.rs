//! The state machine facade.
//!
//! A [`StateMachine`] is built once from a validated configuration and then
//! answers queries for as long as the process lives. It never stores a
//! "current state": callers carry the state value and pass it in.
//!
//! # Example
//!
//! ```rust
//! use simple_state_machine::machine::StateMachine;
//! use simple_state_machine::variables;
//!
//! let machine = StateMachine::builder()
//!     .json(r##"{
//!         "states": [
//!             { "state": "CREATED" },
//!             { "state": "PROCESSING" },
//!             { "state": "REVIEW", "allowedActions": ["APPROVE", "REJECT"] },
//!             { "state": "APPROVED" },
//!             { "state": "ERROR_PROCESSING" }
//!         ],
//!         "transitions": [
//!             { "type": "SUCCESS", "from": "CREATED", "to": "PROCESSING" },
//!             { "type": "ERROR", "from": "PROCESSING", "to": "ERROR_PROCESSING" },
//!             { "type": "CONDITIONAL", "from": "PROCESSING", "conditions": [
//!                 { "when": "#order.totalAmount > 1000", "to": "REVIEW" },
//!                 { "else": "APPROVED" }
//!             ] }
//!         ]
//!     }"##)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(machine.next_state_for_success("CREATED").unwrap(), "PROCESSING");
//!
//! let vars = variables! { "order" => { "totalAmount": 1500 } };
//! assert_eq!(machine.next_state_for_success_with("PROCESSING", &vars).unwrap(), "REVIEW");
//!
//! assert!(machine.is_action_allowed("REVIEW", "APPROVE"));
//! assert!(machine.require_action_allowed("CREATED", "APPROVE").is_err());
//! ```

mod state_machine;

pub use crate::builder::StateMachineBuilder;
pub use state_machine::StateMachine;
