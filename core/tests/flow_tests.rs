// tests/flow_tests.rs
mod common;

use artisan_approval::flow::{skip_when, Flow, FlowContext, FlowControl, FlowError, FlowOutcome, FlowRegistry};
use common::*;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_flow_runs_steps_in_order() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(&[("step1", None), ("step2", None), ("step3", None)]);

  flow.on("step1", create_simple_handler("step1", " S1"));
  flow.on("step2", create_simple_handler("step2", " S2"));
  flow.on("step3", create_simple_handler("step3", " S3"));

  let ctx = FlowContext::new(TestContext::default());
  let result = flow.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), FlowOutcome::Completed);
  let guard = ctx.read();
  assert_eq!(guard.counter, 3);
  assert_eq!(guard.message, " S1 S2 S3");
  assert_eq!(guard.steps_executed, vec!["step1", "step2", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_flow_halts_when_handler_says_so() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(&[("stepA", None), ("haltStep", None), ("stepC", None)]);

  flow.on("stepA", create_simple_handler("stepA", "A"));
  flow.on("haltStep", create_simple_handler("haltStep", "H"));
  flow.on("stepC", create_simple_handler("stepC", "C"));

  let ctx = FlowContext::new(TestContext {
    halt_at: Some("haltStep".to_string()),
    ..Default::default()
  });
  let result = flow.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), FlowOutcome::Halted);
  let guard = ctx.read();
  assert_eq!(guard.message, "AH");
  assert_eq!(guard.steps_executed, vec!["stepA", "haltStep"]);
}

#[tokio::test]
#[serial]
async fn test_flow_propagates_handler_error() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(&[("good_step", None), ("bad_step", None), ("another_step", None)]);

  flow.on("good_step", create_simple_handler("good_step", "Good"));
  flow.on("bad_step", create_failing_handler("bad_step", "I am a bad step!"));
  flow.on("another_step", create_simple_handler("another_step", "NeverRun"));

  let ctx = FlowContext::new(TestContext::default());
  let result = flow.run(ctx.clone()).await;

  assert_eq!(result.unwrap_err(), TestError::Handler("I am a bad step!".to_string()));
  let guard = ctx.read();
  assert_eq!(guard.counter, 1);
  assert_eq!(guard.steps_executed, vec!["good_step", "bad_step"]);
}

#[tokio::test]
#[serial]
async fn test_flow_skips_step_if_condition_met() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(&[
    ("step1", None),
    ("step_to_skip", skip_when(|c: &TestContext| c.counter > 0)),
    ("step3", None),
  ]);

  flow.on("step1", create_simple_handler("step1", " S1"));
  flow.on("step_to_skip", create_simple_handler("step_to_skip", " SKIPPED"));
  flow.on("step3", create_simple_handler("step3", " S3"));

  let ctx = FlowContext::new(TestContext::default());
  assert_eq!(flow.run(ctx.clone()).await.unwrap(), FlowOutcome::Completed);

  let guard = ctx.read();
  assert_eq!(guard.message, " S1 S3");
  assert_eq!(guard.steps_executed, vec!["step1", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_step_without_handler_fails() {
  setup_tracing();
  let flow = Flow::<TestContext, TestError>::new(&[("step_with_no_handler", None)]);

  let result = flow.run(FlowContext::new(TestContext::default())).await;

  match result {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("step_with_no_handler"));
    }
    other => panic!("Expected HandlerMissing, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_on_runs_before_after() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(&[("main_step", None)]);

  flow.after("main_step", create_simple_handler("after_main", "After;"));
  flow.on("main_step", create_simple_handler("on_main", "On;"));

  let ctx = FlowContext::new(TestContext::default());
  flow.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().message, "On;After;");
}

#[tokio::test]
#[serial]
async fn test_failed_on_handler_skips_after() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(&[("main_step", None)]);

  flow.on("main_step", create_failing_handler("on_main", "boom"));
  flow.after("main_step", create_simple_handler("after_main", "After;"));

  let ctx = FlowContext::new(TestContext::default());
  assert!(flow.run(ctx.clone()).await.is_err());
  assert_eq!(ctx.read().steps_executed, vec!["on_main"]);
}

#[test]
#[should_panic(expected = "not part of this flow")]
fn test_registering_unknown_step_panics() {
  let mut flow = Flow::<TestContext, TestError>::new(&[("known", None)]);
  flow.on("unknown", create_simple_handler("unknown", ""));
}

#[derive(Debug, Default)]
struct AlphaCtx {
  val: String,
}

#[derive(Debug, Default)]
struct BetaCtx {
  num: i32,
}

#[tokio::test]
async fn test_registry_dispatches_by_context_type() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();

  let mut alpha = Flow::<AlphaCtx, TestError>::new(&[("alpha_task", None)]);
  alpha.on("alpha_task", |ctx: FlowContext<AlphaCtx>| async move {
    ctx.write().val = "alpha_processed".to_string();
    Ok::<_, TestError>(FlowControl::Continue)
  });
  registry.register(alpha);

  let mut beta = Flow::<BetaCtx, TestError>::new(&[("beta_task", None)]);
  beta.on("beta_task", |ctx: FlowContext<BetaCtx>| async move {
    ctx.write().num = 100;
    Ok::<_, FlowError>(FlowControl::Continue)
  });
  registry.register(beta);

  assert!(registry.is_registered::<AlphaCtx>());
  assert!(registry.is_registered::<BetaCtx>());

  let alpha_ctx = FlowContext::new(AlphaCtx::default());
  assert_eq!(registry.run(alpha_ctx.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(alpha_ctx.read().val, "alpha_processed");

  let beta_ctx = FlowContext::new(BetaCtx::default());
  assert_eq!(registry.run(beta_ctx.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(beta_ctx.read().num, 100);
}

#[tokio::test]
async fn test_registry_rejects_unregistered_context() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();

  #[derive(Debug, Default)]
  struct UnregisteredCtx;

  let result = registry.run(FlowContext::new(UnregisteredCtx)).await;
  match result {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("NotRegistered"));
      assert!(s.contains("UnregisteredCtx"));
    }
    other => panic!("Expected NotRegistered, got {:?}", other),
  }
}

#[tokio::test]
async fn test_context_clones_share_data() {
  let ctx = FlowContext::new(TestContext::default());
  let clone = ctx.clone();
  clone.write().counter = 7;
  assert_eq!(ctx.with(|c| c.counter), 7);
  drop(clone);

  let held = ctx.clone();
  assert!(ctx.into_inner().is_none());
  assert_eq!(held.into_inner().map(|c| c.counter), Some(7));
}
