//! Scenario bodies. Each function runs one seeded iteration and fails with a
//! message naming the first broken expectation.
use anyhow::{Context, Result, bail, ensure};
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use raftquest_game::events::replay;
use raftquest_game::hit_test::image_placement;
use raftquest_game::{
    DragController, DragEvent, DragItemId, DropCandidate, Frame, FusionSlots, HintZone,
    Inventory, MiniGameOutcome, Point, RaftPieceId, Rect, TargetId, Viewport, constants,
    is_rotation_active, resolve_drop_target, resolve_hint_zone, to_physical_point,
    to_physical_rect, to_visual_point, to_visual_rect,
};

use super::TesterAssets;

const FUSION_ATTEMPTS: usize = 32;
const ROUND_TRIP_SAMPLES: usize = 16;
const HINT_SAMPLES: usize = 12;

/// Walk every mission in order, failing steps at random before passing them,
/// fuse each mission's pieces and check a reload sees the same progress.
pub fn smoke(assets: &TesterAssets, rng: &mut ChaCha8Rng) -> Result<()> {
    let (engine, _storage) = assets.engine();
    let mut session = engine.create_session()?;
    ensure!(session.progression().initialized, "first run not initialized");
    let catalog = session.catalog().clone();

    for mission in &catalog.missions {
        let mission_id = mission.id.as_str();
        ensure!(session.is_mission_unlocked(mission_id), "{mission_id} still locked");
        let first = session.start_mission(mission_id)?;
        ensure!(
            first.as_ref() == mission.steps.first(),
            "{mission_id} started at {first:?}"
        );

        for step in &mission.steps {
            while rng.gen_bool(0.3) {
                let report = session.record_outcome(step, &MiniGameOutcome::Failed)?;
                ensure!(
                    !report.succeeded && report.piece.is_none(),
                    "failed attempt at {step} changed progress"
                );
                ensure!(
                    !session.progression().is_step_completed(step.as_str()),
                    "failed attempt completed {step}"
                );
            }
            let report = session.record_outcome(step, &MiniGameOutcome::succeeded())?;
            ensure!(report.newly_completed, "{step} was not newly completed");
            ensure!(
                report.piece == catalog.raft_piece_for_step(step.as_str()),
                "{step} granted {:?}",
                report.piece
            );
            if rng.gen_bool(0.2) {
                let again = session.record_outcome(step, &MiniGameOutcome::succeeded())?;
                ensure!(
                    !again.newly_completed && again.piece.is_none(),
                    "replaying {step} granted a second reward"
                );
            }
        }

        ensure!(session.complete_mission(mission_id)?, "{mission_id} not completed");
        ensure!(session.has_unseen_completion(), "{mission_id} completion not flagged");
        session.acknowledge_latest_completion();
        ensure!(!session.has_unseen_completion(), "acknowledgement ignored");

        let mut pieces: Vec<RaftPieceId> = mission
            .steps
            .iter()
            .filter_map(|s| catalog.raft_piece_for_step(s.as_str()))
            .collect();
        pieces.shuffle(rng);
        let mut slots = FusionSlots::new();
        for (slot, piece) in pieces.into_iter().enumerate() {
            ensure!(slots.place(slot, piece), "slot {slot} refused a piece");
        }
        let fused = session
            .commit_fusion(&mut slots)
            .with_context(|| format!("fusing the pieces of {mission_id}"))?;
        ensure!(fused.is_fused(), "fusion produced {fused}");
    }

    ensure!(session.is_raft_complete(), "raft incomplete after the campaign");
    ensure!(
        (session.raft_progress() - 100.0).abs() < f64::EPSILON,
        "raft progress {}",
        session.raft_progress()
    );

    let (progression, inventory) = replay(session.events().iter(), session.config().max_fused);
    ensure!(
        progression.completed_steps == session.progression().completed_steps
            && progression.completed_missions == session.progression().completed_missions,
        "event log replay diverged from progression"
    );
    ensure!(&inventory == session.inventory(), "event log replay diverged from inventory");

    let restored = engine.create_session()?;
    ensure!(
        restored.progression() == session.progression(),
        "progression lost across reload"
    );
    ensure!(restored.inventory() == session.inventory(), "inventory lost across reload");
    ensure!(restored.ui_flags() == session.ui_flags(), "ui flags lost across reload");
    Ok(())
}

/// Throw random triples at an inventory and compare against the fusion rules.
pub fn fusion(assets: &TesterAssets, rng: &mut ChaCha8Rng) -> Result<()> {
    let max_fused = assets.config.max_fused;
    let pool: Vec<RaftPieceId> = assets
        .catalog
        .steps
        .iter()
        .filter_map(|s| s.reward_piece.clone())
        .collect();
    ensure!(!pool.is_empty(), "catalogue grants no pieces");

    let mut inventory = Inventory::new();
    for piece in &pool {
        if rng.gen_bool(0.7) {
            inventory.add_piece(piece.clone());
        }
    }

    for attempt in 0..FUSION_ATTEMPTS {
        let pick: [RaftPieceId; 3] =
            std::array::from_fn(|_| pool[rng.gen_range(0..pool.len())].clone());
        let distinct = pick[0] != pick[1] && pick[1] != pick[2] && pick[0] != pick[2];
        let expected = inventory.fused_count < max_fused
            && distinct
            && pick.iter().all(|p| inventory.has_piece(p.as_str()));
        let before = inventory.clone();

        match inventory.consume_pieces_for_fusion(&pick, max_fused) {
            Some(fused) => {
                ensure!(expected, "attempt {attempt}: {pick:?} fused but should not");
                ensure!(
                    fused == RaftPieceId::fused(before.fused_count + 1),
                    "attempt {attempt}: minted {fused}"
                );
                ensure!(
                    pick.iter().all(|p| !inventory.has_piece(p.as_str())),
                    "attempt {attempt}: consumed pieces still held"
                );
            }
            None => {
                ensure!(!expected, "attempt {attempt}: {pick:?} rejected but valid");
                ensure!(inventory == before, "attempt {attempt}: rejected fusion mutated state");
            }
        }

        ensure!(inventory.fused_count <= max_fused, "fusion cap exceeded");
        ensure!(
            inventory.fused_pieces.len() == inventory.fused_count as usize,
            "fused count out of sync"
        );
        ensure!(
            inventory.piece_equivalents() <= pool.len(),
            "fusion created pieces from nothing"
        );
    }
    Ok(())
}

/// Random portrait viewports: the visual transform must round-trip, and
/// rotated drops must land on the target nearest in the visual frame.
pub fn rotation(assets: &TesterAssets, rng: &mut ChaCha8Rng) -> Result<()> {
    let width = rng.gen_range(320.0..1200.0);
    let viewport = Viewport::new(width, rng.gen_range(width + 1.0..2400.0));
    ensure!(
        is_rotation_active(viewport.orientation()),
        "portrait {viewport:?} not rotated"
    );
    let visual = viewport.swapped();

    for _ in 0..ROUND_TRIP_SAMPLES {
        let p = Point::new(
            rng.gen_range(0.0..viewport.width),
            rng.gen_range(0.0..viewport.height),
        );
        let v = to_visual_point(p, viewport, true);
        ensure!(
            (0.0..=visual.width).contains(&v.x) && (0.0..=visual.height).contains(&v.y),
            "{p:?} mapped outside the visual viewport to {v:?}"
        );
        ensure!(
            to_physical_point(v, viewport, true).approx_eq(p),
            "{p:?} did not round-trip through {v:?}"
        );
    }

    let count = rng.gen_range(2..6);
    let candidates: Vec<DropCandidate> = (0..count)
        .map(|i| {
            let center = Point::new(
                rng.gen_range(0.0..visual.width),
                rng.gen_range(0.0..visual.height),
            );
            let rect = Rect::from_center(center, 60.0, 60.0);
            let candidate = if rng.gen_bool(0.5) {
                DropCandidate::new(format!("slot-{i}"), rect).in_frame(Frame::Visual)
            } else {
                DropCandidate::new(format!("slot-{i}"), to_physical_rect(rect, viewport, true))
            };
            candidate.disabled(rng.gen_bool(0.2))
        })
        .collect();

    let drop_at = Point::new(
        rng.gen_range(0.0..visual.width),
        rng.gen_range(0.0..visual.height),
    );
    let expected = nearest_visual_target(&candidates, drop_at, viewport);
    let dragged = to_physical_rect(Rect::from_center(drop_at, 40.0, 40.0), viewport, true);
    let resolved = resolve_drop_target(dragged, &candidates, viewport, true);
    ensure!(
        resolved == expected,
        "drop at visual {drop_at:?} resolved to {resolved:?}, nearest is {expected:?}"
    );

    let mut ctrl = DragController::new(&assets.config, viewport, true);
    for candidate in candidates {
        ctrl.register_target(candidate);
    }
    let item = DragItemId::from("dragged-piece");
    let start = Point::new(
        drop_at.x + rng.gen_range(30.0..80.0),
        drop_at.y - rng.gen_range(30.0..80.0),
    );
    let start_rect = to_physical_rect(Rect::from_center(start, 40.0, 40.0), viewport, true);
    let physical_start = to_physical_point(start, viewport, true);
    let physical_end = to_physical_point(drop_at, viewport, true);

    ensure!(
        ctrl.pointer_down(item.clone(), physical_start, start_rect).is_none(),
        "idle controller reported a replaced gesture"
    );
    match ctrl.pointer_move(physical_end) {
        Some(DragEvent::Started { .. }) => {}
        other => bail!("expected the drag to start, got {other:?}"),
    }
    let Some(DragEvent::Dropped { target, .. }) = ctrl.pointer_up(physical_end) else {
        bail!("pointer release did not drop");
    };
    ensure!(
        target.as_ref() == resolve_drop_target(dragged, ctrl.targets(), viewport, true),
        "controller dropped on {target:?}"
    );
    Ok(())
}

/// Nearest enabled candidate by visual center distance, ties to the earliest.
fn nearest_visual_target(
    candidates: &[DropCandidate],
    visual_center: Point,
    viewport: Viewport,
) -> Option<&TargetId> {
    let mut best: Option<(&TargetId, f64)> = None;
    for candidate in candidates.iter().filter(|c| !c.disabled) {
        let rect = match candidate.frame {
            Frame::Visual => candidate.rect,
            Frame::Physical => to_visual_rect(candidate.rect, viewport, true),
        };
        let distance = visual_center.distance_to(rect.center());
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((&candidate.id, distance));
        }
    }
    best.map(|(id, _)| id)
}

/// Click around every catalogue hint zone, rotated and not, and expect the
/// first zone containing the click in image space.
pub fn hints(assets: &TesterAssets, rng: &mut ChaCha8Rng) -> Result<()> {
    let hint_steps = assets
        .catalog
        .steps
        .iter()
        .filter_map(|s| s.background.as_ref().map(|image| (s, image)));

    for (step, image) in hint_steps {
        let visual_width = rng.gen_range(400.0..2000.0);
        let visual_height = rng.gen_range(300.0..1500.0);
        let placement = image_placement(visual_width, visual_height, image)
            .with_context(|| format!("{} has a degenerate background", step.id))?;

        let mut targets: Vec<Point> = step
            .hint_zones
            .iter()
            .map(|zone| jitter_inside(zone, rng))
            .collect();
        targets.extend((0..HINT_SAMPLES).map(|_| {
            Point::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0))
        }));

        for percent in targets {
            let expected = step.hint_zones.iter().find(|z| z.contains(percent));
            let visual = Point::new(
                placement.offset_x + percent.x / 100.0 * placement.scaled_width,
                placement.offset_y + percent.y / 100.0 * placement.scaled_height,
            );

            let flat = Rect::new(0.0, 0.0, visual_width, visual_height);
            let hit = resolve_hint_zone(visual, flat, image, &step.hint_zones, false);
            check_hint(step.id.as_str(), percent, false, hit, expected)?;

            let portrait = Rect::new(0.0, 0.0, visual_height, visual_width);
            let click = Point::new(visual_height - visual.y, visual.x);
            let hit = resolve_hint_zone(click, portrait, image, &step.hint_zones, true);
            check_hint(step.id.as_str(), percent, true, hit, expected)?;
        }
    }
    Ok(())
}

fn jitter_inside(zone: &HintZone, rng: &mut ChaCha8Rng) -> Point {
    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
    let reach = rng.gen_range(0.0..zone.radius * 0.9);
    Point::new(zone.x + reach * angle.cos(), zone.y + reach * angle.sin())
}

fn check_hint(
    step: &str,
    percent: Point,
    rotated: bool,
    hit: Option<&HintZone>,
    expected: Option<&HintZone>,
) -> Result<()> {
    let hit = hit.map(|z| z.id.as_str());
    let expected = expected.map(|z| z.id.as_str());
    ensure!(
        hit == expected,
        "{step} click at image {percent:?} (rotated: {rotated}) hit {hit:?}, expected {expected:?}"
    );
    Ok(())
}

/// Start from a corrupt snapshot, lose storage mid-mission and reload.
pub fn persistence(assets: &TesterAssets, rng: &mut ChaCha8Rng) -> Result<()> {
    let (engine, storage) = assets.engine();
    let corrupt = constants::STORE_KEYS[rng.gen_range(0..constants::STORE_KEYS.len())];
    storage.insert_raw(corrupt, "{ not json");

    let mut session = engine.create_session()?;
    ensure!(
        session.progression().initialized,
        "corrupt {corrupt} blocked initialization"
    );
    let mission = assets
        .catalog
        .missions
        .first()
        .context("catalogue has no missions")?;
    let [first, second, ..] = mission.steps.as_slice() else {
        bail!("{} needs at least two steps", mission.id);
    };

    session.record_outcome(first, &MiniGameOutcome::succeeded())?;
    let saved = storage.raw(constants::STORE_KEY_PROGRESSION);

    storage.set_offline(true);
    let report = session.record_outcome(second, &MiniGameOutcome::succeeded())?;
    ensure!(report.newly_completed, "offline progress was not applied in memory");
    ensure!(
        storage.raw(constants::STORE_KEY_PROGRESSION) == saved,
        "offline write reached storage"
    );
    storage.set_offline(false);

    let mut reloaded = engine.create_session()?;
    ensure!(
        reloaded.progression().is_step_completed(first.as_str()),
        "{first} lost across reload"
    );
    ensure!(
        !reloaded.progression().is_step_completed(second.as_str()),
        "{second} survived without a successful write"
    );

    reloaded.reset_all();
    let exported = engine.export_snapshots()?;
    ensure!(
        exported.get(constants::STORE_KEY_PROGRESSION).is_some(),
        "reset left no progression snapshot"
    );
    ensure!(
        exported.get(constants::STORE_KEY_INVENTORY).is_none(),
        "reset kept the inventory snapshot"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn run(check: fn(&TesterAssets, &mut ChaCha8Rng) -> Result<()>) {
        let assets = TesterAssets::load_default().unwrap();
        for seed in [1, 7, 1337] {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            if let Err(err) = check(&assets, &mut rng) {
                panic!("seed {seed}: {err:#}");
            }
        }
    }

    #[test]
    fn smoke_passes() {
        run(smoke);
    }

    #[test]
    fn fusion_passes() {
        run(fusion);
    }

    #[test]
    fn rotation_passes() {
        run(rotation);
    }

    #[test]
    fn hints_passes() {
        run(hints);
    }

    #[test]
    fn persistence_passes() {
        run(persistence);
    }

    #[test]
    fn nearest_target_skips_disabled() {
        let viewport = Viewport::new(600.0, 800.0);
        let candidates = vec![
            DropCandidate::new("near", Rect::from_center(Point::new(10.0, 10.0), 4.0, 4.0))
                .in_frame(Frame::Visual)
                .disabled(true),
            DropCandidate::new("far", Rect::from_center(Point::new(90.0, 90.0), 4.0, 4.0))
                .in_frame(Frame::Visual),
        ];
        let hit = nearest_visual_target(&candidates, Point::new(0.0, 0.0), viewport);
        assert_eq!(hit.map(TargetId::as_str), Some("far"));
    }
}
