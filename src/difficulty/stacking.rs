use crate::model::hit_object::HitObject;

const STACK_DISTANCE: f32 = 3.0;

/// Computes stack heights for tightly overlapping objects so their effective
/// positions can be nudged before any strain calculation.
///
/// Heights are recomputed from scratch on every call, so applying the pass
/// twice yields identical positions.
pub fn apply_stacking(hit_objects: &mut [HitObject], stack_threshold: f64) {
    for h in hit_objects.iter_mut() {
        h.stack_height = 0;
    }

    let mut extended_start_idx = 0;

    let Some(extended_end_idx) = hit_objects.len().checked_sub(1) else {
        return;
    };

    for i in (1..=extended_end_idx).rev() {
        let mut n = i;
        let mut obj_i_idx = i;
        // * We should check every note which has not yet got a stack.
        // * Consider the case we have two interwound stacks and this will make sense.
        // *   o <-1      o <-2
        // *    o <-3      o <-4
        // * We first process starting from 4 and handle 2,
        // * then we come backwards on the i loop iteration until we reach 3 and handle 1.
        // * 2 and 1 will be ignored in the i loop because they already have a stack value.

        if hit_objects[obj_i_idx].stack_height != 0 || hit_objects[obj_i_idx].is_spinner() {
            continue;
        }

        // * If this object is a hitcircle, then we enter this "special" case.
        // * It either ends with a stack of hitcircles only,
        // * or a stack of hitcircles that are underneath a slider.
        // * Any other case is handled by the "is_slider" code below this.
        if hit_objects[obj_i_idx].is_circle() {
            loop {
                n = match n.checked_sub(1) {
                    Some(n) => n,
                    None => break,
                };

                if hit_objects[n].is_spinner() {
                    continue;
                }

                if hit_objects[obj_i_idx].start_time - hit_objects[n].end_time() > stack_threshold {
                    break; // * We are no longer within stacking range of the previous object.
                }

                // * HitObjects before the specified update range haven't been reset yet
                if n < extended_start_idx {
                    hit_objects[n].stack_height = 0;
                    extended_start_idx = n;
                }

                // * This is a special case where hitcircles are moved DOWN and RIGHT (negative stacking)
                // * if they are under the *last* slider in a stacked pattern.
                // *    o==o <- slider is at original location
                // *        o <- hitCircle has stack of -1
                // *         o <- hitCircle has stack of -2
                if hit_objects[n].is_slider()
                    && hit_objects[n]
                        .end_pos()
                        .distance(hit_objects[obj_i_idx].pos)
                        < STACK_DISTANCE
                {
                    let offset =
                        hit_objects[obj_i_idx].stack_height - hit_objects[n].stack_height + 1;

                    for j in n + 1..=i {
                        // * For each object which was declared under this slider, we will offset
                        // * it to appear *below* the slider end (rather than above).
                        if hit_objects[n].end_pos().distance(hit_objects[j].pos) < STACK_DISTANCE {
                            hit_objects[j].stack_height -= offset;
                        }
                    }

                    // * We have hit a slider. We should restart calculation using this as the new base.
                    // * Breaking here will mean that the slider still has a stack height of 0,
                    // * so will be handled in the i-outer-loop.
                    break;
                }

                if hit_objects[n].pos.distance(hit_objects[obj_i_idx].pos) < STACK_DISTANCE {
                    // * Keep processing as if there are no sliders.
                    // * If we come across a slider, this gets cancelled out.
                    // * NOTE: Sliders with start positions stacking
                    // * are a special case that is also handled here.

                    hit_objects[n].stack_height = hit_objects[obj_i_idx].stack_height + 1;
                    obj_i_idx = n;
                }
            }
        } else if hit_objects[obj_i_idx].is_slider() {
            // * We have hit the first slider in a possible stack.
            // * From this point on, we ALWAYS stack positive regardless.
            loop {
                n = match n.checked_sub(1) {
                    Some(n) => n,
                    None => break,
                };

                if hit_objects[n].is_spinner() {
                    continue;
                }

                if hit_objects[obj_i_idx].start_time - hit_objects[n].start_time > stack_threshold {
                    break; // * We are no longer within stacking range of the previous object.
                }

                if hit_objects[n]
                    .end_pos()
                    .distance(hit_objects[obj_i_idx].pos)
                    < STACK_DISTANCE
                {
                    hit_objects[n].stack_height = hit_objects[obj_i_idx].stack_height + 1;
                    obj_i_idx = n;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::apply_stacking;
    use crate::{model::hit_object::HitObject, util::pos::Pos};

    fn stacked_circles() -> Vec<HitObject> {
        vec![
            HitObject::circle(Pos::new(100.0, 100.0), 0.0),
            HitObject::circle(Pos::new(100.0, 100.0), 100.0),
            HitObject::circle(Pos::new(100.0, 100.0), 200.0),
        ]
    }

    #[test]
    fn perfect_overlaps_stack_up() {
        let mut objects = stacked_circles();
        apply_stacking(&mut objects, 1000.0);

        assert_eq!(objects[0].stack_height, 2);
        assert_eq!(objects[1].stack_height, 1);
        assert_eq!(objects[2].stack_height, 0);
    }

    #[test]
    fn pass_is_idempotent() {
        let mut once = stacked_circles();
        apply_stacking(&mut once, 1000.0);

        let mut twice = once.clone();
        apply_stacking(&mut twice, 1000.0);

        let heights_once: Vec<_> = once.iter().map(|h| h.stack_height).collect();
        let heights_twice: Vec<_> = twice.iter().map(|h| h.stack_height).collect();

        assert_eq!(heights_once, heights_twice);
    }

    #[test]
    fn distant_objects_do_not_stack() {
        let mut objects = vec![
            HitObject::circle(Pos::new(100.0, 100.0), 0.0),
            HitObject::circle(Pos::new(300.0, 100.0), 100.0),
        ];

        apply_stacking(&mut objects, 1000.0);

        assert_eq!(objects[0].stack_height, 0);
        assert_eq!(objects[1].stack_height, 0);
    }
}
