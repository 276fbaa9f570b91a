use super::*;
use crate::classify::Label;
use crate::error::UlamError;
use proptest::prelude::*;

const N: Label = Label::Nirvana;

fn counts(n_cells: usize, pairs: &[(Label, Label)]) -> TransitionCounts {
    let (s, e): (Vec<Label>, Vec<Label>) = pairs.iter().copied().unzip();
    TransitionCounts::from_labels(&s, &e, n_cells)
}

fn assert_row_stochastic(p: &nalgebra::DMatrix<f64>) {
    for row in p.row_iter() {
        assert!((row.sum() - 1.0).abs() < 1e-12, "row sum {}", row.sum());
        assert!(row.iter().all(|&v| v >= 0.0));
    }
}

#[test]
fn quadrant_self_loops_give_a_diagonal_count_matrix() {
    let pairs: Vec<_> = (0..4).map(|i| (Label::Inside(i), Label::Inside(i))).collect();
    let c = counts(4, &pairs);
    let raw = TransitionMatrix::from_counts(&c);
    assert_eq!(raw.n_states(), 5);
    let m = raw.counts();
    for i in 0..5 {
        for j in 0..5 {
            let expect = if i == j && i < 4 { 1.0 } else { 0.0 };
            assert_eq!(m[(i, j)], expect, "({i}, {j})");
        }
    }
    // Every cell has outgoing mass, so pass 1 keeps all four; nirvana received
    // nothing and goes.
    let (pruned, removed) = raw.remove_empty_rows(&DataReinjection).unwrap();
    assert_eq!(
        pruned.states(),
        &[StateId::Cell(0), StateId::Cell(1), StateId::Cell(2), StateId::Cell(3)]
    );
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].state, StateId::Nirvana);
    // Four isolated loops: the largest-component rule keeps the first.
    let (scc, dis) = pruned.keep_dominant_scc(&DataReinjection).unwrap();
    assert_eq!(scc.states(), &[StateId::Cell(0)]);
    assert_eq!(dis.len(), 3);
}

#[test]
fn exits_and_entries_land_in_the_nirvana_row_and_column() {
    let c = counts(2, &[(N, Label::Inside(1)), (Label::Inside(0), N)]);
    assert_eq!(c.get(2, 1), 1);
    assert_eq!(c.get(0, 2), 1);
    let raw = TransitionMatrix::from_counts(&c);
    assert_eq!(raw.counts()[(2, 1)], 1.0);
    assert_eq!(raw.counts()[(0, 2)], 1.0);
}

#[test]
fn data_policy_reinjects_where_entries_were_seen() {
    let c = counts(
        3,
        &[
            (Label::Inside(0), Label::Inside(1)),
            (Label::Inside(1), Label::Inside(2)),
            (Label::Inside(2), N),
            (Label::Inside(2), Label::Inside(0)),
            (N, Label::Inside(0)),
            (N, Label::Inside(0)),
            (N, Label::Inside(1)),
            (N, N),
        ],
    );
    let chain = clean_and_stochasticize(&c, &DataReinjection).unwrap();
    assert!(chain.removed_empty.is_empty());
    assert!(chain.disconnected.is_empty());
    let (p, states, observed) = chain.matrix.into_probabilities();
    assert_eq!(states.last(), Some(&StateId::Nirvana));
    assert_eq!(observed, vec![1, 1, 2, 4]);
    assert_row_stochastic(&p);
    // Self-loop excluded: 2/3 into cell 0, 1/3 into cell 1.
    assert!((p[(3, 0)] - 2.0 / 3.0).abs() < 1e-12);
    assert!((p[(3, 1)] - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(p[(3, 3)], 0.0);
    assert!((p[(2, 3)] - 0.5).abs() < 1e-12);
}

#[test]
fn source_policy_with_one_target_is_one_hot() {
    let c = counts(
        3,
        &[
            (Label::Inside(0), Label::Inside(1)),
            (Label::Inside(1), Label::Inside(2)),
            (Label::Inside(2), N),
            (Label::Inside(1), N),
            (N, Label::Inside(0)),
        ],
    );
    let src = SourceReinjection::from_targets([1]).unwrap();
    let chain = clean_and_stochasticize(&c, &src).unwrap();
    let (p, states, _) = chain.matrix.into_probabilities();
    // Cell 0 is never re-entered under the source policy and drops out.
    assert_eq!(states, vec![StateId::Cell(1), StateId::Cell(2), StateId::Nirvana]);
    assert_eq!(chain.disconnected[0].state, StateId::Cell(0));
    assert_eq!(p.row(2).iter().copied().collect::<Vec<_>>(), vec![1.0, 0.0, 0.0]);
    assert_row_stochastic(&p);
}

#[test]
fn cells_unreachable_from_nirvana_are_reported_as_disconnected() {
    let c = counts(
        3,
        &[
            (Label::Inside(0), N),
            (N, Label::Inside(0)),
            (Label::Inside(2), Label::Inside(2)),
            (Label::Inside(2), Label::Inside(2)),
        ],
    );
    let chain = clean_and_stochasticize(&c, &DataReinjection).unwrap();
    assert_eq!(chain.removed_empty.len(), 1);
    assert_eq!(chain.removed_empty[0].state, StateId::Cell(1));
    assert_eq!(
        chain.disconnected,
        vec![Removed {
            state: StateId::Cell(2),
            observed: 2
        }]
    );
    assert_eq!(chain.matrix.states(), &[StateId::Cell(0), StateId::Nirvana]);
}

#[test]
fn rows_emptied_by_removal_are_removed_in_turn() {
    // Cell 2 only feeds cell 3, which nobody starts in.
    let c = counts(
        4,
        &[
            (Label::Inside(0), Label::Inside(1)),
            (Label::Inside(1), Label::Inside(0)),
            (Label::Inside(1), Label::Inside(2)),
            (Label::Inside(2), Label::Inside(3)),
        ],
    );
    let chain = clean_and_stochasticize(&c, &DataReinjection).unwrap();
    let removed_empty: Vec<_> = chain.removed_empty.iter().map(|r| r.state).collect();
    assert_eq!(removed_empty, vec![StateId::Cell(3), StateId::Nirvana]);
    assert_eq!(chain.disconnected[0].state, StateId::Cell(2));
    let (p, states, _) = chain.matrix.into_probabilities();
    assert_eq!(states, vec![StateId::Cell(0), StateId::Cell(1)]);
    // Mass 1 -> 2 is redistributed onto 1 -> 0.
    assert_eq!(p[(1, 0)], 1.0);
}

#[test]
fn no_observations_remove_everything() {
    let c = TransitionCounts::new(3);
    let err = clean_and_stochasticize(&c, &DataReinjection).unwrap_err();
    assert!(matches!(
        err,
        UlamError::AllStatesRemoved {
            stage: "empty_rows_removed"
        }
    ));
}

#[test]
fn only_exits_leave_no_component() {
    // Cells only leave the domain and nothing comes back.
    let c = counts(2, &[(Label::Inside(0), N), (Label::Inside(1), N)]);
    assert!(matches!(
        clean_and_stochasticize(&c, &DataReinjection),
        Err(UlamError::AllStatesRemoved { .. })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn cleaned_chains_are_stochastic_and_strongly_connected(
        pairs in proptest::collection::vec((0usize..7, 0usize..7), 1..120),
        source in proptest::bool::ANY,
    ) {
        let n_cells = 6;
        let label = |k: usize| if k == n_cells { N } else { Label::Inside(k) };
        let pairs: Vec<_> = pairs.into_iter().map(|(a, b)| (label(a), label(b))).collect();
        let c = counts(n_cells, &pairs);
        let reinj: Box<dyn Reinjection> = if source {
            Box::new(SourceReinjection::everywhere())
        } else {
            Box::new(DataReinjection)
        };
        if let Ok(chain) = clean_and_stochasticize(&c, reinj.as_ref()) {
            let (p, states, _) = chain.matrix.into_probabilities();
            prop_assert_eq!(p.nrows(), states.len());
            for row in p.row_iter() {
                prop_assert!((row.sum() - 1.0).abs() < 1e-12);
                prop_assert!(row.iter().all(|&v| v >= 0.0));
            }
            let adj: Vec<Vec<usize>> = p
                .row_iter()
                .map(|r| (0..r.len()).filter(|&j| r[j] > 0.0).collect())
                .collect();
            prop_assert_eq!(tarjan_scc(&adj).len(), 1);
            let kept = states.len() + chain.removed_empty.len() + chain.disconnected.len();
            prop_assert_eq!(kept, n_cells + 1);
        }
    }
}
