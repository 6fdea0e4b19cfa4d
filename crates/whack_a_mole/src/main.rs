fn main() {
    whack_a_mole_3d::run();
}
