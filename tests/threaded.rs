use std::sync::{Arc, RwLock};
use std::thread;

use seclang::{Compiler, Phase, RuleSet, Transaction};

fn compile(program: &str) -> RuleSet {
    let mut compiler = Compiler::new();
    compiler.parse_str(program, "threaded.conf").unwrap();
    compiler.finish()
}

#[test]
fn evaluate_across_threads() {
    let rules = Arc::new(compile(concat!(
        "SecRule REQUEST_URI \"@beginsWith /admin\" \"id:400,phase:1,msg:'admin area'\"\n",
        "SecRule REQUEST_URI \"@contains ../\" \"id:401,phase:1,msg:'traversal'\"\n",
        "SecRule REQUEST_URI \"@rx \\.php$\" \"id:402,phase:1,msg:'php endpoint'\"\n",
    )));

    let mut handles = vec![];

    // Thread 1: admin path -> 400
    let rs = Arc::clone(&rules);
    handles.push(thread::spawn(move || {
        let tx = Transaction::new(1);
        rs.eval_phase(Phase::RequestHeaders, &tx, "/admin/settings")
    }));

    // Thread 2: dot-dot escape -> 401
    let rs = Arc::clone(&rules);
    handles.push(thread::spawn(move || {
        let tx = Transaction::new(2);
        rs.eval_phase(Phase::RequestHeaders, &tx, "/static/../etc/passwd")
    }));

    // Thread 3: trips every rule at once
    let rs = Arc::clone(&rules);
    handles.push(thread::spawn(move || {
        let tx = Transaction::new(3);
        rs.eval_phase(Phase::RequestHeaders, &tx, "/admin/../index.php")
    }));

    // Thread 4: clean path -> nothing
    let rs = Arc::clone(&rules);
    handles.push(thread::spawn(move || {
        let tx = Transaction::new(4);
        rs.eval_phase(Phase::RequestHeaders, &tx, "/healthz")
    }));

    let results: Vec<Vec<u64>> = handles
        .into_iter()
        .map(|h| h.join().unwrap().iter().map(|hit| hit.rule_id).collect())
        .collect();

    assert_eq!(results[0], vec![400]);
    assert_eq!(results[1], vec![401]);
    assert_eq!(results[2], vec![400, 401, 402]);
    assert_eq!(results[3], Vec::<u64>::new());
}

#[test]
fn hot_reload_swaps_the_whole_table() {
    let shared = Arc::new(RwLock::new(Arc::new(compile(
        "SecRule REQUEST_URI \"@contains blocked\" \"id:500,phase:1\"\n",
    ))));
    let tx = Transaction::new(9);

    // A reader takes a snapshot before the reload.
    let snapshot = Arc::clone(&shared.read().unwrap());
    assert_eq!(
        snapshot.eval_phase(Phase::RequestHeaders, &tx, "/blocked/x").len(),
        1
    );

    let next = Arc::new(compile(concat!(
        "SecRule REQUEST_URI \"@contains blocked\" \"id:500,phase:1\"\n",
        "SecRule REQUEST_URI \"@endsWith .bak\" \"id:501,phase:1\"\n",
    )));
    *shared.write().unwrap() = Arc::clone(&next);

    // The old snapshot keeps answering with the old rules.
    assert!(snapshot
        .eval_phase(Phase::RequestHeaders, &tx, "/backup.bak")
        .is_empty());

    // New readers see the new table.
    let fresh = Arc::clone(&shared.read().unwrap());
    assert_eq!(
        fresh.eval_phase(Phase::RequestHeaders, &tx, "/backup.bak").len(),
        1
    );
    assert_eq!(fresh.len(), 2);
}

#[test]
fn readers_race_a_swap_without_tearing() {
    let shared = Arc::new(RwLock::new(Arc::new(compile(
        "SecRule ARGS \"@contains x\" \"id:510,phase:2\"\n",
    ))));

    let mut handles = vec![];
    for worker in 0..4_u64 {
        let shared = Arc::clone(&shared);
        handles.push(thread::spawn(move || {
            let tx = Transaction::new(worker);
            let mut seen = vec![];
            for _ in 0..200 {
                let table = Arc::clone(&shared.read().unwrap());
                seen.push(table.eval_phase(Phase::RequestBody, &tx, "x=1").len());
            }
            seen
        }));
    }

    let next = Arc::new(compile(concat!(
        "SecRule ARGS \"@contains x\" \"id:510,phase:2\"\n",
        "SecRule ARGS \"@contains x=1\" \"id:511,phase:2\"\n",
    )));
    *shared.write().unwrap() = next;

    for handle in handles {
        for hits in handle.join().unwrap() {
            // Every observation is a complete table: one rule or two.
            assert!(hits == 1 || hits == 2, "torn read: {hits} hits");
        }
    }
}
