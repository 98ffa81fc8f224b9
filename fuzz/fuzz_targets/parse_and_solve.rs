#![no_main]

use libfuzzer_sys::fuzz_target;

use maze_search::algorithms::uninformed::solve_with_policy;
use maze_search::frontier::FrontierPolicy;
use maze_search::problem::Problem;
use maze_search::problems::maze_2d::Maze2DProblem;
use maze_search::space::Space;

fuzz_target!(|data: &str| {
    let Ok(problem) = Maze2DProblem::try_from(data) else {
        return;
    };
    for policy in [FrontierPolicy::Stack, FrontierPolicy::Queue] {
        let result = solve_with_policy(problem.clone(), policy, None, None);
        if let Some(path) = result.solution() {
            assert!(problem.space().valid_path(path));
            assert_eq!(path.end(), problem.goal());
        }
    }
});
