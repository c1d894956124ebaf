//! Order Workflow
//!
//! This demo walks two orders through a configuration-driven workflow.
//!
//! Key concepts:
//! - Loading a machine definition through bootstrap settings
//! - Conditional routing on order variables
//! - Action authorization with violations logged as events
//!
//! Run with: RUST_LOG=debug cargo run --example order_workflow

use simple_state_machine::events::TracingPublisher;
use simple_state_machine::registry::{Bootstrap, BootstrapSettings, MemoryLoader};
use simple_state_machine::{variables, StateMachine, Variables};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const ORDER_WORKFLOW: &str = r##"
states:
  - state: CREATED
    allowedActions: [CANCEL]
  - state: PROCESSING
  - state: REVIEW
    allowedActions: [APPROVE, REJECT]
  - state: APPROVED
  - state: ERROR_PROCESSING
    allowedActions: [RETRY]

transitions:
  - type: SUCCESS
    from: CREATED
    to: PROCESSING
  - type: ERROR
    from: PROCESSING
    to: ERROR_PROCESSING
  - type: CONDITIONAL
    from: PROCESSING
    conditions:
      - when: "#order.totalAmount > 1000 or #order.priority == 'manual'"
        to: REVIEW
      - else: APPROVED
  - type: SUCCESS
    from: ERROR_PROCESSING
    to: CREATED
  - type: SUCCESS
    from: REVIEW
    to: APPROVED
"##;

struct Order {
    id: u64,
    variables: Variables,
    payment_fails: bool,
}

fn run(machine: &StateMachine, order: &Order) -> simple_state_machine::Result<()> {
    let mut state = "CREATED";
    println!("order {}: {state}", order.id);

    state = machine.next_state_for_success(state)?;
    println!("order {}: -> {state}", order.id);

    state = if order.payment_fails {
        machine.next_state_for_error_with(state, &order.variables)?
    } else {
        machine.next_state_for_success_with(state, &order.variables)?
    };
    println!("order {}: -> {state}", order.id);

    if machine.require_action_allowed(state, "APPROVE").is_ok() {
        state = machine.next_state_for_success(state)?;
        println!("order {}: approved by reviewer -> {state}", order.id);
    }

    if machine.require_one_state_of(state, &["APPROVED"]).is_err() {
        println!("order {}: stopped in {state}", order.id);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let loader = MemoryLoader::new().with("workflows/order.yaml", ORDER_WORKFLOW);
    let settings = BootstrapSettings::from_yaml_str(
        "simple-state-machine:\n  definition: classpath:workflows/order.yaml\n",
    )?;

    let machine = Bootstrap::new(loader)
        .publisher(Arc::new(TracingPublisher))
        .run(&settings)?
        .into_single()
        .ok_or("expected a single state machine")?;

    let orders = [
        Order {
            id: 1,
            variables: variables! { "order" => { "totalAmount": 250, "priority": "auto" } },
            payment_fails: false,
        },
        Order {
            id: 2,
            variables: variables! { "order" => { "totalAmount": 4800, "priority": "auto" } },
            payment_fails: false,
        },
        Order {
            id: 3,
            variables: variables! { "order" => { "totalAmount": 90, "priority": "manual" } },
            payment_fails: true,
        },
    ];

    for order in &orders {
        run(&machine, order)?;
    }
    Ok(())
}
