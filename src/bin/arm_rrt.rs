// Joint-space RRT for a planar 4R manipulator
// Plans around two obstacles and prints the resulting configurations.
// Run with RUST_LOG=debug to follow the tree growth.

use robotics_decisions::arm_navigation::ManipulatorEnv;
use robotics_decisions::path_planning::{PlanStatus, RRTConfig, RRTPlanner};
use robotics_decisions::{CircleObstacle, Configuration, RoboticsResult};

fn run() -> RoboticsResult<()> {
    let obstacles = vec![
        CircleObstacle::new(1.5, 2.0, 0.4),
        CircleObstacle::new(-2.0, -1.5, 0.6),
        CircleObstacle::new(0.5, -2.5, 0.5),
    ];
    let env = ManipulatorEnv::new(obstacles, 0.05)?;

    let start = Configuration::new([0.0, 0.0, 0.0, 0.0]);
    let goal = Configuration::new([150.0, -20.0, 30.0, 10.0]);

    let config = RRTConfig {
        seed: Some(0),
        ..Default::default()
    };
    let planner = RRTPlanner::with_l1(env, config)?;
    let plan = planner.plan(&start, &goal)?;

    match plan.status {
        PlanStatus::ReachedGoal => println!("Goal reached after {} iterations", plan.iterations),
        PlanStatus::BestEffort { distance_to_goal } => println!(
            "No path within {} iterations, closest node is {:.2} from goal",
            plan.iterations, distance_to_goal
        ),
    }
    println!("Tree size: {} nodes", plan.tree_size());
    println!("Path length: {} states", plan.path.len());

    for (i, q) in plan.path.iter().enumerate() {
        let tip = planner.env().forward_kinematics(q);
        println!("{:4}: {}  tip ({:.3}, {:.3})", i, q, tip.x, tip.y);
    }
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
