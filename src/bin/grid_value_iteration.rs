// Value iteration (deterministic) and MDP (noisy) solvers on a grid world
// Prints both policies and rolls each one out from the start cell.

use rand::rngs::StdRng;
use rand::SeedableRng;

use robotics_decisions::decision_making::{
    Action, Mdp, Policy, Rollout, SolverConfig, ValueIteration,
};
use robotics_decisions::scene::GridScene;
use robotics_decisions::utils::OccupancyGrid;
use robotics_decisions::{GridCell, GridSolver, RoboticsResult};

const MAX_STEPS: usize = 100;

// Noise used only while replaying the policies
const ROLLOUT_EPSILON: f64 = 0.001;

fn arrow(action: Action) -> char {
    match action {
        Action::Up => '^',
        Action::Down => 'v',
        Action::Left => '<',
        Action::Right => '>',
    }
}

fn print_policy(name: &str, policy: &Policy, scene: &GridScene) {
    println!("{} policy:", name);
    let (nrows, ncols) = scene.occupancy.shape();
    for row in 0..nrows as i32 {
        let line: String = (0..ncols as i32)
            .map(|col| {
                let cell = GridCell::new(row, col);
                if cell == scene.goal {
                    'G'
                } else {
                    policy.action(cell).map(arrow).unwrap_or('#')
                }
            })
            .collect();
        println!("  {}", line);
    }
}

fn print_rollout(name: &str, rollout: &Rollout) {
    println!(
        "{} rollout: {:?} after {} steps",
        name,
        rollout.end,
        rollout.cells.len() - 1
    );
}

fn run() -> RoboticsResult<()> {
    let occupancy = OccupancyGrid::from_rows(&[
        [0, 0, 0, 0, 0, 0, 0, 0],
        [0, 1, 1, 1, 0, 1, 1, 0],
        [0, 0, 0, 1, 0, 0, 1, 0],
        [1, 1, 0, 1, 1, 0, 1, 0],
        [0, 0, 0, 0, 0, 0, 0, 0],
        [0, 1, 1, 1, 1, 1, 1, 0],
        [0, 0, 0, 0, 0, 0, 1, 0],
    ])?;
    let scene = GridScene {
        occupancy,
        start: GridCell::new(0, 0),
        goal: GridCell::new(6, 5),
        epsilon: 0.4,
    };
    let world = scene.world()?;
    let quiet = world.with_epsilon(ROLLOUT_EPSILON)?;
    let mut rng = StdRng::seed_from_u64(0);

    let vi = ValueIteration::new(&world, SolverConfig::default())?.solve()?;
    println!(
        "VI: {:?}, G*(start) = {:?}",
        vi.convergence,
        vi.table.get(scene.start)?
    );
    print_policy("VI", &vi.policy, &scene);
    print_rollout("VI", &vi.policy.rollout(&quiet, scene.start, MAX_STEPS, &mut rng)?);

    let mdp = Mdp::with_defaults(&world)?.solve()?;
    println!(
        "MDP: {:?}, v*(start) = {:.4}",
        mdp.convergence,
        mdp.table.get(scene.start)?
    );
    print_policy("MDP", &mdp.policy, &scene);
    print_rollout("MDP", &mdp.policy.rollout(&quiet, scene.start, MAX_STEPS, &mut rng)?);

    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
