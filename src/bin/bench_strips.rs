use gol_strips::*;

fn main() {
    // the same random soup on every worker count, the counts must agree
    let size = 512;
    let generations = 200;
    let pattern = Pattern::random(size, size, 0.35, Some(42)).unwrap();
    let config = Config::default()
        .with_size(size)
        .with_generations(generations)
        .with_pattern(pattern);

    let mut reference = Simulation::new(&config.clone().with_workers(1)).unwrap();
    let expected = reference.run(generations, false);
    println!(
        "sequential -> {:.3} secs",
        expected.elapsed.as_secs_f64()
    );

    for workers in [1, 2, 4, 8, 16] {
        let report = run_cluster(&config.clone().with_workers(workers)).unwrap();
        assert_eq!(report.counts, expected.counts, "workers={}", workers);
        println!(
            "workers={:<3} -> {:.3} secs",
            workers,
            report.elapsed.as_secs_f64()
        );
    }
}
