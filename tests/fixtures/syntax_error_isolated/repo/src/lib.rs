mod broken;

struct Whole;
