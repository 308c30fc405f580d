use log::trace;

use gauge_core::{Model, Observer, OptimizationProblem, Snapshot};

use crate::optimization::{Goal, evaluate};

use super::{Action, Config, Error, Event, Point, Solution, Status, bracket::Bracket};

struct Best<I, O> {
    point: Point,
    snapshot: Snapshot<I, O>,
}

/// Evaluates points, reports them and tracks the best one.
struct Probe<'p, M, P, Obs> {
    model: &'p M,
    problem: &'p P,
    goal: Goal,
    observer: Obs,
}

impl<M, P, Obs> Probe<'_, M, P, Obs>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a, M::Input, M::Output>, Action>,
{
    fn eval(&self, x: f64) -> Result<(Point, Snapshot<M::Input, M::Output>), Error> {
        let evaluation = evaluate(self.model, self.problem, &[x])?;
        let point = Point {
            x,
            objective: evaluation.objective,
        };
        trace!("golden section: f({x}) = {}", point.objective);
        Ok((point, evaluation.snapshot))
    }

    /// Returns `true` if the observer asks to stop.
    fn report(
        &mut self,
        iter: usize,
        point: Point,
        snapshot: &Snapshot<M::Input, M::Output>,
        bracket: &Bracket,
        best: Point,
    ) -> bool {
        let event = Event {
            iter,
            point,
            input: &snapshot.input,
            output: &snapshot.output,
            bracket: bracket.bounds(),
            best,
        };
        matches!(self.observer.observe(&event), Some(Action::StopEarly))
    }

    fn first(
        &mut self,
        x: f64,
        bracket: &Bracket,
    ) -> Result<(Best<M::Input, M::Output>, bool), Error> {
        let (point, snapshot) = self.eval(x)?;
        let stop = self.report(0, point, &snapshot, bracket, point);
        Ok((Best { point, snapshot }, stop))
    }

    fn next(
        &mut self,
        iter: usize,
        x: f64,
        bracket: &Bracket,
        best: &mut Best<M::Input, M::Output>,
    ) -> Result<(Point, bool), Error> {
        let (point, snapshot) = self.eval(x)?;
        let improved = self.goal.improves(point.objective, best.point.objective);
        let best_point = if improved { point } else { best.point };
        let stop = self.report(iter, point, &snapshot, bracket, best_point);
        if improved {
            *best = Best { point, snapshot };
        }
        Ok((point, stop))
    }
}

fn finish<I, O>(status: Status, best: Best<I, O>, iters: usize) -> Solution<I, O> {
    Solution {
        status,
        x: best.point.x,
        objective: best.point.objective,
        snapshot: best.snapshot,
        iters,
    }
}

pub(super) fn run<M, P, Obs>(
    model: &M,
    problem: &P,
    bounds: [f64; 2],
    goal: Goal,
    config: &Config,
    observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: OptimizationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a, M::Input, M::Output>, Action>,
{
    let mut probe = Probe {
        model,
        problem,
        goal,
        observer,
    };
    let mut bracket = Bracket::new(bounds);

    let (mut best, stop) = probe.first(bracket.lower(), &bracket)?;
    let mut lower = best.point;
    if stop {
        return Ok(finish(Status::StoppedByObserver, best, 0));
    }
    let (mut upper, stop) = probe.next(0, bracket.upper(), &bracket, &mut best)?;
    if stop {
        return Ok(finish(Status::StoppedByObserver, best, 0));
    }

    let mut iters = 0;
    loop {
        if bracket.gap() <= config.tolerance_at(bracket.mid()) {
            return Ok(finish(Status::Converged, best, iters));
        }
        if iters == config.max_iters() {
            return Ok(finish(Status::MaxIters, best, iters));
        }
        iters += 1;

        // Ties and NaN objectives keep the lower side.
        let keep_lower = !goal.improves(upper.objective, lower.objective);
        let stop = if keep_lower {
            let x = bracket.keep_lower();
            let (point, stop) = probe.next(iters, x, &bracket, &mut best)?;
            upper = lower;
            lower = point;
            stop
        } else {
            let x = bracket.keep_upper();
            let (point, stop) = probe.next(iters, x, &bracket, &mut best)?;
            lower = upper;
            upper = point;
            stop
        };
        if stop {
            return Ok(finish(Status::StoppedByObserver, best, iters));
        }
    }
}
