use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use glob::glob;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use maze_search::algorithms::uninformed::solve_with_policy;
use maze_search::frontier::FrontierPolicy;
use maze_search::problems::maze_2d::Maze2DProblem;

const POLICIES: [FrontierPolicy; 2] = [FrontierPolicy::Stack, FrontierPolicy::Queue];
const RANDOM_INSTANCES: u64 = 5;
const RANDOM_SIDE: usize = 64;

fn compare_frontiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("Maze2D Uninformed Search");

    let mut instances = vec![];
    for path in glob("data/mazes/*.txt")
        .unwrap()
        .filter_map(std::result::Result::ok)
    {
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        let problem = Maze2DProblem::try_from(path.as_path()).unwrap();
        instances.push((name, problem));
    }
    for i in 0..RANDOM_INSTANCES {
        let mut rng = ChaCha8Rng::seed_from_u64(i);
        if let Some(problem) = Maze2DProblem::random(&mut rng, RANDOM_SIDE, RANDOM_SIDE, 0.3) {
            instances.push((format!("random:{i}"), problem));
        }
    }

    for (name, problem) in &instances {
        let instance_name = format!("{name}[{}x{}]", problem.height(), problem.width());
        for policy in POLICIES {
            let result = solve_with_policy(problem.clone(), policy, None, None);
            match result.solution() {
                Some(path) => println!(
                    "{instance_name} {policy}: {} expansions. Path: {path}",
                    result.num_expanded
                ),
                None => println!("{instance_name} {policy}: no solution"),
            }

            group.bench_with_input(
                BenchmarkId::new(policy.to_string(), &instance_name),
                problem,
                |b, p| b.iter(|| solve_with_policy(p.clone(), policy, None, None)),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, compare_frontiers);
criterion_main!(benches);
