//! Built-in muscle targets for common exercises.

use crate::model::Muscle::{self, *};

pub(super) static BUILTIN_EXERCISES: &[(&str, Muscle, &[Muscle])] = &[
    // Chest
    ("Bench Press", Chest, &[FrontDelts, Triceps]),
    ("Incline Bench Press", Chest, &[FrontDelts, Triceps]),
    ("Dumbbell Bench Press", Chest, &[FrontDelts, Triceps]),
    ("Dumbbell Fly", Chest, &[FrontDelts]),
    ("Push-Up", Chest, &[FrontDelts, Triceps, Abs]),
    ("Dip", Chest, &[FrontDelts, Triceps]),
    // Back
    ("Pull-Up", Lats, &[Biceps, RearDelts, UpperBack]),
    ("Chin-Up", Lats, &[Biceps, UpperBack]),
    ("Lat Pulldown", Lats, &[Biceps, RearDelts]),
    ("Barbell Row", UpperBack, &[Lats, RearDelts, Biceps, LowerBack]),
    ("Dumbbell Row", UpperBack, &[Lats, RearDelts, Biceps]),
    ("Seated Cable Row", UpperBack, &[Lats, RearDelts, Biceps]),
    ("Shrug", Traps, &[Forearms]),
    ("Face Pull", RearDelts, &[UpperBack, Traps]),
    // Shoulders
    ("Overhead Press", FrontDelts, &[SideDelts, Triceps]),
    ("Dumbbell Shoulder Press", FrontDelts, &[SideDelts, Triceps]),
    ("Lateral Raise", SideDelts, &[Traps]),
    ("Reverse Fly", RearDelts, &[UpperBack]),
    // Arms
    ("Barbell Curl", Biceps, &[Forearms]),
    ("Dumbbell Curl", Biceps, &[Forearms]),
    ("Hammer Curl", Biceps, &[Forearms]),
    ("Triceps Pushdown", Triceps, &[]),
    ("Skull Crusher", Triceps, &[]),
    ("Wrist Curl", Forearms, &[]),
    // Legs
    ("Squat", Quads, &[Glutes, Adductors, LowerBack]),
    ("Front Squat", Quads, &[Glutes, Abs]),
    ("Leg Press", Quads, &[Glutes]),
    ("Bulgarian Split Squat", Quads, &[Glutes, Adductors]),
    ("Lunge", Quads, &[Glutes, Hamstrings]),
    ("Leg Extension", Quads, &[]),
    ("Deadlift", Hamstrings, &[Glutes, LowerBack, Traps, Forearms]),
    ("Romanian Deadlift", Hamstrings, &[Glutes, LowerBack]),
    ("Leg Curl", Hamstrings, &[Calves]),
    ("Hip Thrust", Glutes, &[Hamstrings]),
    ("Hip Abduction", Abductors, &[Glutes]),
    ("Hip Adduction", Adductors, &[]),
    ("Standing Calf Raise", Calves, &[]),
    ("Seated Calf Raise", Calves, &[]),
    // Core
    ("Crunch", Abs, &[Obliques]),
    ("Hanging Leg Raise", Abs, &[Obliques]),
    ("Plank", Abs, &[Obliques, LowerBack]),
    ("Russian Twist", Obliques, &[Abs]),
    ("Back Extension", LowerBack, &[Glutes, Hamstrings]),
    ("Neck Curl", Neck, &[]),
];
