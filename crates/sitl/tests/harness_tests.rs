use std::time::Duration;

use armgate_core::arming::{
    ArmMethod, ArmingSystem, AuxAuthError, CheckCategory, InternalErrorKind, Severity,
};
use armgate_core::parameters::ArmingParams;
use armgate_sitl::{
    spawn_authorizer, Authorizer, Decision, FixedDecision, PrearmLoop, Silent, SimVehicle,
    SitlError, TokioTime, TracingSink,
};
use async_trait::async_trait;

fn texts(sink: &TracingSink) -> Vec<String> {
    sink.drain().iter().map(|m| m.text.to_string()).collect()
}

/// Refuses without giving a reason.
struct Grumpy;

#[async_trait]
impl Authorizer for Grumpy {
    fn name(&self) -> &str {
        "grumpy"
    }

    async fn decide(&self) -> Decision {
        Decision::Refuse(None)
    }
}

#[test]
fn test_authorizer_is_object_safe() {
    let authorizers: Vec<Box<dyn Authorizer>> = vec![
        Box::new(Grumpy),
        Box::new(Silent::new("quiet")),
        Box::new(FixedDecision::approve_after("companion", Duration::ZERO)),
    ];
    let names: Vec<&str> = authorizers.iter().map(|a| a.name()).collect();
    assert_eq!(names, ["grumpy", "quiet", "companion"]);
}

#[tokio::test(start_paused = true)]
async fn test_ready_after_authoriser_approves() {
    let vehicle = SimVehicle::default();
    let sink = TracingSink::new();
    let mut gate = ArmingSystem::new(
        ArmingParams::default(),
        TokioTime::new(),
        &sink,
        vehicle.collaborators(),
    );

    let handle = spawn_authorizer(
        gate.aux_auth(),
        FixedDecision::approve_after("companion", Duration::from_millis(2_500)),
    )
    .unwrap();

    // Evaluations at 0, 1, 2 and 3 seconds
    let cycle = PrearmLoop::new().run_until_ready(&mut gate, 10).await.unwrap();
    assert_eq!(cycle, 4);
    handle.join().await.unwrap();

    let lines = sink.drain();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].severity, Severity::Critical);
    assert_eq!(
        lines[0].text.as_str(),
        "PreArm: Waiting for auxiliary authorisation"
    );
}

#[tokio::test(start_paused = true)]
async fn test_silent_authoriser_blocks_indefinitely() {
    let vehicle = SimVehicle::default();
    let sink = TracingSink::new();
    let mut gate = ArmingSystem::new(
        ArmingParams::default(),
        TokioTime::new(),
        &sink,
        vehicle.collaborators(),
    );
    let handle = spawn_authorizer(gate.aux_auth(), Silent::new("companion")).unwrap();

    let err = PrearmLoop::new()
        .run_until_ready(&mut gate, 5)
        .await
        .unwrap_err();
    assert!(matches!(err, SitlError::Timeout("pre-arm checks")));
    assert_eq!(
        texts(&sink),
        ["PreArm: Waiting for auxiliary authorisation"]
    );

    assert!(gate.arm(ArmMethod::Mavlink, true).is_err());
    assert!(!gate.state().armed);
    handle.abort();
}

#[tokio::test(start_paused = true)]
async fn test_refusal_reason_displayed() {
    let vehicle = SimVehicle::default();
    let sink = TracingSink::new();
    let mut gate = ArmingSystem::new(
        ArmingParams::default(),
        TokioTime::new(),
        &sink,
        vehicle.collaborators(),
    );
    let table = gate.aux_auth();
    spawn_authorizer(
        table.clone(),
        FixedDecision::refuse_after("geofence", Duration::ZERO, Some("No flight zone".into())),
    )
    .unwrap()
    .join()
    .await
    .unwrap();
    spawn_authorizer(table, Grumpy).unwrap().join().await.unwrap();

    // The lowest failed slot owns the message
    let err = PrearmLoop::new()
        .run_until_ready(&mut gate, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, SitlError::Timeout(_)));
    assert_eq!(texts(&sink), ["PreArm: No flight zone"]);
}

#[tokio::test(start_paused = true)]
async fn test_fourth_authoriser_latches_error() {
    let vehicle = SimVehicle::default();
    let sink = TracingSink::new();
    let mut gate = ArmingSystem::new(
        ArmingParams::default(),
        TokioTime::new(),
        &sink,
        vehicle.collaborators(),
    );

    let mut handles = Vec::new();
    for n in 0..3 {
        let approve = FixedDecision::approve_after(format!("a{n}"), Duration::ZERO);
        handles.push(spawn_authorizer(gate.aux_auth(), approve).unwrap());
    }
    let err = spawn_authorizer(gate.aux_auth(), Silent::new("a3")).unwrap_err();
    assert!(matches!(err, SitlError::AuxAuth(AuxAuthError::CapacityExceeded)));
    for handle in handles {
        handle.join().await.unwrap();
    }

    // Every slot approved, but the latched error still blocks
    assert!(!gate.update());
    assert_eq!(texts(&sink), ["PreArm: Too many auxiliary authorisers"]);

    gate.reset_aux_auth();
    assert!(gate.update());
}

#[tokio::test(start_paused = true)]
async fn test_redundant_imus_need_consistency_window() {
    let vehicle = SimVehicle::new(2);
    let sink = TracingSink::new();
    let mut gate = ArmingSystem::new(
        ArmingParams::default(),
        TokioTime::new(),
        &sink,
        vehicle.collaborators(),
    );

    // Both agreement windows open at t=0 and settle together at t=10s
    let cycle = PrearmLoop::new().run_until_ready(&mut gate, 30).await.unwrap();
    assert_eq!(cycle, 11);
    assert_eq!(texts(&sink), ["PreArm: Accels inconsistent"]);
}

#[tokio::test(start_paused = true)]
async fn test_internal_error_latched_from_another_task() {
    let vehicle = SimVehicle::default();
    let sink = TracingSink::new();
    let mut gate = ArmingSystem::new(
        ArmingParams::default(),
        TokioTime::new(),
        &sink,
        vehicle.collaborators(),
    );
    gate.set_enabled_checks(CheckCategory::empty());

    let errors = gate.internal_errors();
    tokio::spawn(async move {
        errors.record(InternalErrorKind::TERRAIN_CONTRACT, 12);
    })
    .await
    .unwrap();

    assert!(gate.arm(ArmMethod::Mavlink, true).is_err());
    assert_eq!(
        texts(&sink),
        ["Arm: Internal errors 0x8 l:12 terrain_contract"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_arm_disarm_cycle_resets_authorisation() {
    let vehicle = SimVehicle::default();
    let sink = TracingSink::new();
    let params = ArmingParams {
        safety_on_disarm: true,
        ..ArmingParams::default()
    };
    let mut gate = ArmingSystem::new(
        params,
        TokioTime::new(),
        &sink,
        vehicle.collaborators(),
    );
    let table = gate.aux_auth();
    let handle = spawn_authorizer(
        table.clone(),
        FixedDecision::approve_after("companion", Duration::from_millis(500)),
    )
    .unwrap();
    let slot = handle.slot;

    PrearmLoop::new().run_until_ready(&mut gate, 5).await.unwrap();
    handle.join().await.unwrap();

    gate.arm(ArmMethod::Mavlink, true).unwrap();
    tokio::time::advance(Duration::from_secs(3)).await;
    assert_eq!(gate.arm_duration_ms(), Some(3_000));
    gate.disarm(ArmMethod::Mavlink, true).unwrap();

    // The slot is gone; a late report is ignored
    assert_eq!(table.slot_count(), 0);
    table.report_passed(slot);
    assert_eq!(table.response(slot), None);

    let events = vehicle.logger.events();
    assert_eq!(events.len(), 2);
    assert!(events[0].armed);
    assert!(!events[1].armed);
    assert!(vehicle.safety.engaged.load(std::sync::atomic::Ordering::Relaxed));
}

#[tokio::test(start_paused = true)]
async fn test_emergency_stop_blocks_then_clears() {
    let vehicle = SimVehicle::default();
    let sink = TracingSink::new();
    let mut gate = ArmingSystem::new(
        ArmingParams::default(),
        TokioTime::new(),
        &sink,
        vehicle.collaborators(),
    );
    vehicle.safety.estopped.store(true, std::sync::atomic::Ordering::Relaxed);
    vehicle.gps.set_failure("Bad GPS Position");

    assert!(!gate.update());
    assert_eq!(
        texts(&sink),
        ["PreArm: Bad GPS Position", "PreArm: Motors Emergency Stopped"]
    );

    vehicle.safety.estopped.store(false, std::sync::atomic::Ordering::Relaxed);
    vehicle.gps.clear();
    assert!(gate.update());
}
