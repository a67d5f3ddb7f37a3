//! cellgraph_engine - Formula parsing, evaluation and dependency ordering.

pub mod engine;

#[cfg(test)]
mod tests {
    use crate::engine::*;
    use std::collections::HashMap;

    /// Minimal driver: formulas keyed by name, recomputed in dependency order.
    fn recompute(
        formulas: &HashMap<&str, Formula>,
        graph: &DependencyGraph,
        changed: &str,
        values: &mut HashMap<String, f64>,
    ) -> Vec<String> {
        let order = cells_to_recalculate(graph, changed).unwrap();
        for name in &order {
            if let Some(f) = formulas.get(name.as_str()) {
                let value = f
                    .evaluate(|v| {
                        values
                            .get(v)
                            .copied()
                            .ok_or_else(|| LookupError::new(format!("{v} is empty")))
                    })
                    .unwrap();
                values.insert(name.clone(), value);
            }
        }
        order
    }

    #[test]
    fn test_formula_variables_drive_the_graph() {
        let b1 = Formula::parse("A1*2").unwrap();
        let c1 = Formula::parse("B1*A1").unwrap();

        let mut graph = DependencyGraph::new();
        graph.replace_dependees("B1", b1.variables());
        graph.replace_dependees("C1", c1.variables());
        assert_eq!(graph.len(), 3);

        let formulas = HashMap::from([("B1", b1), ("C1", c1)]);
        let mut values = HashMap::from([("A1".to_string(), 3.0)]);
        let order = recompute(&formulas, &graph, "A1", &mut values);

        assert_eq!(order, vec!["A1", "B1", "C1"]);
        assert_eq!(values["B1"], 6.0);
        assert_eq!(values["C1"], 18.0);
    }

    #[test]
    fn test_replacing_a_formula_drops_old_edges() {
        let mut graph = DependencyGraph::new();
        graph.replace_dependees("C1", Formula::parse("A1+B1").unwrap().variables());
        graph.replace_dependees("C1", Formula::parse("B1").unwrap().variables());

        assert!(!graph.contains("A1"));
        assert_eq!(cells_to_recalculate(&graph, "A1").unwrap(), vec!["A1"]);
        assert_eq!(cells_to_recalculate(&graph, "B1").unwrap(), vec!["B1", "C1"]);
    }

    #[test]
    fn test_formula_round_trips_through_display() {
        for raw in ["x1 + y2", "(3.0 + 1) * _z", "2.5e1/4", "((a))-b*c"] {
            let f = Formula::parse(raw).unwrap();
            assert_eq!(f.to_string().parse::<Formula>().unwrap(), f);
        }
    }

    #[test]
    fn test_rule_names() {
        let cases = [
            ("", FormulaRule::OneToken),
            ("(3+1))", FormulaRule::RightParentheses),
            ("()", FormulaRule::ParenthesisOperatorFollowing),
            ("2x+y3", FormulaRule::ExtraFollowing),
            ("(1", FormulaRule::BalancedParentheses),
        ];
        for (raw, rule) in cases {
            assert_eq!(Formula::parse(raw).unwrap_err().rule(), rule, "{raw:?}");
        }
    }
}
