use std::{error::Error, fs};

use rl_horizon::{
    algo::PolicyShift,
    env::Environment,
    gym::{BridgeOrchard, BridgeOrchardConfig},
    io::write_plan,
};

fn main() -> Result<(), Box<dyn Error>> {
    let env = BridgeOrchard::new(BridgeOrchardConfig {
        horizon: 20,
        r_harvest: 1.0,
        c_repair: -0.2,
        r_burn: 6.0,
        ..Default::default()
    })?;
    let gamma = 0.98;

    let shift = PolicyShift::compare(&env, gamma, 0.0, 3.0)?;
    let (baseline_action, shaped_action) = shift.start_actions();

    println!("Start state: {}", env.start_state());
    println!("Baseline action: {baseline_action}");
    println!("Shaped action: {shaped_action}");

    for (name, plan) in [("Baseline", shift.baseline()), ("Shaped", shift.shaped())] {
        let trajectory = plan.rollout(&env)?;
        println!(
            "{name} rollout: reward {:.2}, irreversible harm {:.1}",
            trajectory.total_reward(),
            trajectory.total_delta_omega()
        );
    }

    println!("{} decision states changed", shift.changes().len());

    // Write tables to CSV

    fs::create_dir_all("demos/irreversibility_shift/out")?;

    for (name, plan) in [("baseline", shift.baseline()), ("shaped", shift.shaped())] {
        let file = fs::File::create(format!("demos/irreversibility_shift/out/{name}.csv"))?;
        write_plan(plan, file)?;
    }

    Ok(())
}
